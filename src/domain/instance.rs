// ==========================================
// 会议论文排程系统 - 实例数据领域模型
// ==========================================
// 职责: 一次运行的只读输入 (实体 ID 集合 + 四个稀疏关系)
// 红线: 运行期间不可变;模型构建、求解、组装均不得修改
// ==========================================
// 关系映射:
// - preferences  U(b,p) = 投标者 b 对论文 p 的效用 (>= 0)
// - authorship   M(a,p) = 作者 a 是论文 p 的作者
// - conflicts    T(j,p) = 论文 p 不能安排在 session j
// - paper_topics Q(p,t) = 论文 p 属于主题 t
// ==========================================

use crate::domain::types::{AuthorId, BidderId, PaperId, SessionId, Slot, TopicId, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// 实例数据错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstanceError {
    #[error("实体 ID 重复: {entity} {id}")]
    DuplicateId { entity: &'static str, id: u32 },

    #[error("关系 {relation} 引用了未知的 {entity} {id}")]
    UnknownReference {
        relation: &'static str,
        entity: &'static str,
        id: u32,
    },

    #[error("效用值非法 (bidder={bidder}, paper={paper}): {value}")]
    InvalidUtility {
        bidder: BidderId,
        paper: PaperId,
        value: f64,
    },

    #[error("实例为空: 缺少 {0}")]
    Empty(&'static str),
}

// ==========================================
// InstanceData - 实例数据
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    // ===== 实体 ID 集合 =====
    pub session_ids: Vec<SessionId>,
    pub track_ids: Vec<TrackId>,
    pub paper_ids: Vec<PaperId>,
    pub bidder_ids: Vec<BidderId>,
    pub author_ids: Vec<AuthorId>,
    pub topic_ids: Vec<TopicId>,

    // ===== 稀疏关系 =====
    #[serde(with = "preference_entries", default)]
    pub preferences: BTreeMap<(BidderId, PaperId), f64>,
    #[serde(with = "authorship_entries", default)]
    pub authorship: BTreeSet<(AuthorId, PaperId)>,
    #[serde(with = "conflict_entries", default)]
    pub conflicts: BTreeSet<(SessionId, PaperId)>,
    #[serde(with = "topic_entries", default)]
    pub paper_topics: BTreeSet<(PaperId, TopicId)>,
}

impl InstanceData {
    /// 所有 slot,按 session 外层、track 内层的笛卡尔积顺序
    pub fn slots(&self) -> Vec<Slot> {
        self.session_ids
            .iter()
            .flat_map(|&j| self.track_ids.iter().map(move |&k| Slot::new(j, k)))
            .collect()
    }

    /// 受 session 约束的作者集合
    ///
    /// 只有关联 >= 2 篇论文的作者才需要出席约束,
    /// 单篇作者不可能跨 session 重复安排。
    /// 直接由每位作者的论文计数推导,与关系的遍历顺序无关。
    pub fn constrained_authors(&self) -> BTreeSet<AuthorId> {
        let mut paper_count: BTreeMap<AuthorId, usize> = BTreeMap::new();
        for (author, _) in &self.authorship {
            *paper_count.entry(*author).or_insert(0) += 1;
        }
        paper_count
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(author, _)| author)
            .collect()
    }

    /// 受约束作者的 (author, paper) 关系子集
    pub fn constrained_authorship(&self) -> Vec<(AuthorId, PaperId)> {
        let constrained = self.constrained_authors();
        self.authorship
            .iter()
            .filter(|(a, _)| constrained.contains(a))
            .copied()
            .collect()
    }

    /// 校验实例一致性
    ///
    /// # 规则
    /// 1) 各实体 ID 集合内不重复
    /// 2) 关系只能引用已声明的实体
    /// 3) 效用值有限且 >= 0
    /// 4) 至少一个 session 和一个 track
    pub fn validate(&self) -> Result<(), InstanceError> {
        if self.session_ids.is_empty() {
            return Err(InstanceError::Empty("session_ids"));
        }
        if self.track_ids.is_empty() {
            return Err(InstanceError::Empty("track_ids"));
        }

        let sessions = unique_set("session", self.session_ids.iter().map(|s| s.0))?;
        unique_set("track", self.track_ids.iter().map(|k| k.0))?;
        let papers = unique_set("paper", self.paper_ids.iter().map(|p| p.0))?;
        let bidders = unique_set("bidder", self.bidder_ids.iter().map(|b| b.0))?;
        let authors = unique_set("author", self.author_ids.iter().map(|a| a.0))?;
        let topics = unique_set("topic", self.topic_ids.iter().map(|t| t.0))?;

        for (&(bidder, paper), &value) in &self.preferences {
            check_ref("preferences", "bidder", &bidders, bidder.0)?;
            check_ref("preferences", "paper", &papers, paper.0)?;
            if !value.is_finite() || value < 0.0 {
                return Err(InstanceError::InvalidUtility {
                    bidder,
                    paper,
                    value,
                });
            }
        }
        for &(author, paper) in &self.authorship {
            check_ref("authorship", "author", &authors, author.0)?;
            check_ref("authorship", "paper", &papers, paper.0)?;
        }
        for &(session, paper) in &self.conflicts {
            check_ref("conflicts", "session", &sessions, session.0)?;
            check_ref("conflicts", "paper", &papers, paper.0)?;
        }
        for &(paper, topic) in &self.paper_topics {
            check_ref("paper_topics", "paper", &papers, paper.0)?;
            check_ref("paper_topics", "topic", &topics, topic.0)?;
        }

        Ok(())
    }
}

fn unique_set(
    entity: &'static str,
    ids: impl Iterator<Item = u32>,
) -> Result<BTreeSet<u32>, InstanceError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(InstanceError::DuplicateId { entity, id });
        }
    }
    Ok(seen)
}

fn check_ref(
    relation: &'static str,
    entity: &'static str,
    known: &BTreeSet<u32>,
    id: u32,
) -> Result<(), InstanceError> {
    if known.contains(&id) {
        Ok(())
    } else {
        Err(InstanceError::UnknownReference {
            relation,
            entity,
            id,
        })
    }
}

// ==========================================
// 稀疏关系的序列化格式
// ==========================================
// JSON 对象键只能是字符串,这里统一编码为条目列表:
// preferences  -> [{"bidder":1,"paper":2,"utility":10.0}, ...]
// authorship   -> [{"author":1,"paper":2}, ...]
// conflicts    -> [{"session":1,"paper":2}, ...]
// paper_topics -> [{"paper":1,"topic":2}, ...]

mod preference_entries {
    use super::*;
    use serde::{Deserializer, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Entry {
        bidder: BidderId,
        paper: PaperId,
        utility: f64,
    }

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<(BidderId, PaperId), f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter().map(|(&(bidder, paper), &utility)| Entry {
            bidder,
            paper,
            utility,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(BidderId, PaperId), f64>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| ((e.bidder, e.paper), e.utility))
            .collect())
    }
}

macro_rules! pair_entries {
    ($module:ident, $left_ty:ty, $left:ident, $right_ty:ty, $right:ident) => {
        mod $module {
            use super::*;
            use serde::{Deserializer, Serializer};

            #[derive(Serialize, Deserialize)]
            struct Entry {
                $left: $left_ty,
                $right: $right_ty,
            }

            pub fn serialize<S: Serializer>(
                set: &BTreeSet<($left_ty, $right_ty)>,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(set.iter().map(|&($left, $right)| Entry { $left, $right }))
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<BTreeSet<($left_ty, $right_ty)>, D::Error> {
                let entries = Vec::<Entry>::deserialize(deserializer)?;
                Ok(entries.into_iter().map(|e| (e.$left, e.$right)).collect())
            }
        }
    };
}

pair_entries!(authorship_entries, AuthorId, author, PaperId, paper);
pair_entries!(conflict_entries, SessionId, session, PaperId, paper);
pair_entries!(topic_entries, PaperId, paper, TopicId, topic);
