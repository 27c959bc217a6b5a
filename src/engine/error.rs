// ==========================================
// 会议论文排程系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================
// 分类:
// - UsageError     调用顺序/配置错误 (程序员错误)
// - ModelBugError  求解结果违反模型 (模型或适配器缺陷,必须中止)
// - Infeasible     无可行解 (调用方可放松约束后重建)
// - SolverFailure  求解器失败 (资源/内部错误)
// ==========================================

use crate::domain::instance::InstanceError;
use crate::domain::types::{PaperId, Slot};
use thiserror::Error;

/// 调用方式错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UsageError {
    #[error("模型已构建,不允许重复 build()")]
    AlreadyBuilt,

    #[error("模型尚未构建,请先调用 build()")]
    NotBuilt,

    #[error("尚无求解结果,请先调用 solve()")]
    NotSolved,

    #[error("未知的论文分配模式: {0}（仅支持 exact / upper_bound）")]
    UnknownDistribution(String),

    #[error("参数非法 ({name}): {value}")]
    InvalidParameter { name: &'static str, value: String },
}

/// 求解结果与模型不一致
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelBugError {
    #[error("论文 {paper} 未被恰好分配到一个 slot (实际 {} 个: {slots:?})", slots.len())]
    PaperNotAllocated { paper: PaperId, slots: Vec<Slot> },

    #[error("赋值长度不匹配: 模型变量 {expected} 个, 赋值 {actual} 个")]
    AssignmentSizeMismatch { expected: usize, actual: usize },

    #[error("约束不满足 {name}: lhs={lhs} {sense} rhs={rhs}")]
    ConstraintViolated {
        name: String,
        lhs: f64,
        sense: String,
        rhs: f64,
    },

    #[error("目标值不一致: 求解器报告 {reported}, 重算 {recomputed}")]
    ObjectiveMismatch { reported: f64, recomputed: f64 },
}

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("模型缺陷: {0}")]
    ModelBug(#[from] ModelBugError),

    #[error("实例数据非法: {0}")]
    Instance(#[from] InstanceError),

    #[error("QIP 无可行解")]
    Infeasible,

    #[error("求解失败: {reason}")]
    SolverFailure { reason: String },

    #[error("论文 {0} 缺少标题元数据")]
    MissingPaperMetadata(PaperId),
}

impl EngineError {
    /// 是否为调用方可处理的结果状态 (无可行解 / 求解失败)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::Infeasible | EngineError::SolverFailure { .. }
        )
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
