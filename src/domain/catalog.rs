// ==========================================
// 会议论文排程系统 - 论文元数据目录
// ==========================================
// 职责: 论文 ID -> 标题 / 作者列表 / 主题列表 的查询
// 说明: 组装排程时的外部查询协作方,不参与建模
// ==========================================

use crate::domain::types::PaperId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Trait: PaperLookup
// ==========================================
// 用途: ScheduleAssembler 的元数据来源接口
pub trait PaperLookup {
    /// 论文标题;未登记返回 None
    fn title(&self, paper: PaperId) -> Option<&str>;

    /// 作者显示名列表;未登记返回空
    fn authors(&self, paper: PaperId) -> &[String];

    /// 主题显示名列表;未登记返回空
    fn topics(&self, paper: PaperId) -> &[String];
}

// ==========================================
// PaperCatalog - 内存目录实现
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperCatalog {
    #[serde(default)]
    pub titles: BTreeMap<PaperId, String>,
    #[serde(default)]
    pub authors: BTreeMap<PaperId, Vec<String>>,
    #[serde(default)]
    pub topics: BTreeMap<PaperId, Vec<String>>,
}

impl PaperCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一篇论文的完整元数据
    pub fn insert(
        &mut self,
        paper: PaperId,
        title: impl Into<String>,
        authors: Vec<String>,
        topics: Vec<String>,
    ) {
        self.titles.insert(paper, title.into());
        self.authors.insert(paper, authors);
        self.topics.insert(paper, topics);
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl PaperLookup for PaperCatalog {
    fn title(&self, paper: PaperId) -> Option<&str> {
        self.titles.get(&paper).map(String::as_str)
    }

    fn authors(&self, paper: PaperId) -> &[String] {
        self.authors.get(&paper).map(Vec::as_slice).unwrap_or(&[])
    }

    fn topics(&self, paper: PaperId) -> &[String] {
        self.topics.get(&paper).map(Vec::as_slice).unwrap_or(&[])
    }
}
