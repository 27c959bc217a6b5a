// ==========================================
// 会议论文排程系统 - 领域模型层
// ==========================================
// 职责: 定义实体 ID、实例数据、元数据目录、排程结果
// 红线: 不含建模逻辑,不含求解逻辑
// ==========================================

pub mod catalog;
pub mod instance;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use catalog::{PaperCatalog, PaperLookup};
pub use instance::{InstanceData, InstanceError};
pub use schedule::{PaperDetail, PaperEntry, Schedule, SlotSchedule};
pub use types::{
    AuthorId, BidderId, PaperDistribution, PaperId, SessionId, Slot, TopicId, TrackId,
};
