// ==========================================
// 会议论文排程系统 - 领域类型定义
// ==========================================
// 职责: 实体 ID、Slot (session, track) 与分配模式
// 红线: ID 为不透明小整数,不携带业务含义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::error::UsageError;

// ==========================================
// 实体 ID
// ==========================================
// 序列化为裸整数 (serde transparent),保证稀疏键往返一致
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// 论文 ID
    PaperId
);
entity_id!(
    /// 时段 (session) ID
    SessionId
);
entity_id!(
    /// 分会场 (track) ID
    TrackId
);
entity_id!(
    /// 投标者 (参会者) ID
    BidderId
);
entity_id!(
    /// 作者 ID
    AuthorId
);
entity_id!(
    /// 主题 ID
    TopicId
);

// ==========================================
// Slot - 排程原子单元
// ==========================================
// 一个 (session, track) 对;排序先按 session 再按 track
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub session: SessionId,
    pub track: TrackId,
}

impl Slot {
    pub fn new(session: SessionId, track: TrackId) -> Self {
        Self { session, track }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session:{}|Track:{}", self.session, self.track)
    }
}

// ==========================================
// 论文分配模式 (Paper Distribution)
// ==========================================
// Exact: 每个 slot 恰好 capacity 篇
// UpperBound: 每个 slot 至多 capacity 篇
// 序列化格式: "exact" / "upper_bound"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaperDistribution {
    Exact,
    UpperBound,
}

impl fmt::Display for PaperDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperDistribution::Exact => write!(f, "exact"),
            PaperDistribution::UpperBound => write!(f, "upper_bound"),
        }
    }
}

impl FromStr for PaperDistribution {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(PaperDistribution::Exact),
            "upper_bound" => Ok(PaperDistribution::UpperBound),
            other => Err(UsageError::UnknownDistribution(other.to_string())),
        }
    }
}

impl TryFrom<String> for PaperDistribution {
    type Error = UsageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaperDistribution> for String {
    fn from(value: PaperDistribution) -> Self {
        value.to_string()
    }
}
