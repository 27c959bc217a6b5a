// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use conference_scheduler::domain::catalog::PaperCatalog;
use conference_scheduler::domain::instance::InstanceData;
use conference_scheduler::domain::types::{
    AuthorId, BidderId, PaperId, SessionId, TopicId, TrackId,
};

// ==========================================
// InstanceData 构建器
// ==========================================
// 实体 ID 统一从 1 开始连续编号

pub struct InstanceBuilder {
    instance: InstanceData,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self {
            instance: InstanceData::default(),
        }
    }

    /// sessions × tracks 网格
    pub fn grid(mut self, sessions: u32, tracks: u32) -> Self {
        self.instance.session_ids = (1..=sessions).map(SessionId).collect();
        self.instance.track_ids = (1..=tracks).map(TrackId).collect();
        self
    }

    pub fn papers(mut self, n: u32) -> Self {
        self.instance.paper_ids = (1..=n).map(PaperId).collect();
        self
    }

    pub fn bidders(mut self, n: u32) -> Self {
        self.instance.bidder_ids = (1..=n).map(BidderId).collect();
        self
    }

    pub fn authors(mut self, n: u32) -> Self {
        self.instance.author_ids = (1..=n).map(AuthorId).collect();
        self
    }

    pub fn topics(mut self, n: u32) -> Self {
        self.instance.topic_ids = (1..=n).map(TopicId).collect();
        self
    }

    /// 投标: U(b,p) = utility
    pub fn bid(mut self, bidder: u32, paper: u32, utility: f64) -> Self {
        self.instance
            .preferences
            .insert((BidderId(bidder), PaperId(paper)), utility);
        self
    }

    /// 作者关系: M(a,p) = 1
    pub fn wrote(mut self, author: u32, paper: u32) -> Self {
        self.instance
            .authorship
            .insert((AuthorId(author), PaperId(paper)));
        self
    }

    /// 时间冲突: T(j,p) = 1
    pub fn conflict(mut self, session: u32, paper: u32) -> Self {
        self.instance
            .conflicts
            .insert((SessionId(session), PaperId(paper)));
        self
    }

    /// 主题归属: Q(p,t) = 1
    pub fn topic_of(mut self, paper: u32, topic: u32) -> Self {
        self.instance
            .paper_topics
            .insert((PaperId(paper), TopicId(topic)));
        self
    }

    pub fn build(self) -> InstanceData {
        self.instance
    }
}

// ==========================================
// PaperCatalog 构建
// ==========================================

/// 按实例关系生成目录: "Paper Title p" / "Author{a}" / "Topic{t}"
pub fn catalog_for(instance: &InstanceData) -> PaperCatalog {
    let mut catalog = PaperCatalog::new();
    for &p in &instance.paper_ids {
        let authors = instance
            .authorship
            .iter()
            .filter(|(_, paper)| *paper == p)
            .map(|(a, _)| format!("Author{}", a))
            .collect();
        let topics = instance
            .paper_topics
            .iter()
            .filter(|(paper, _)| *paper == p)
            .map(|(_, t)| format!("Topic{}", t))
            .collect();
        catalog.insert(p, format!("Paper Title {}", p), authors, topics);
    }
    catalog
}

/// 2×2 网格 4 篇论文, 3 个投标者, 2 位作者, 2 个主题
pub fn small_mixed_instance() -> InstanceData {
    InstanceBuilder::new()
        .grid(2, 2)
        .papers(4)
        .bidders(3)
        .authors(2)
        .topics(2)
        .bid(1, 1, 30.0)
        .bid(1, 2, 20.0)
        .bid(2, 3, 50.0)
        .bid(2, 1, 10.0)
        .bid(3, 4, 40.0)
        .bid(3, 2, 5.0)
        .wrote(1, 1)
        .wrote(1, 3)
        .wrote(2, 2)
        .topic_of(1, 1)
        .topic_of(2, 1)
        .topic_of(3, 2)
        .topic_of(4, 2)
        .topic_of(4, 1)
        .conflict(1, 4)
        .build()
}
