// ==========================================
// 会议论文排程系统 - 引擎层
// ==========================================
// 职责: QIP 建模、求解适配、解校验与排程组装
// 数据流: InstanceData -> ModelBuilder -> SolverAdapter
//        -> SolutionExtractor -> ScheduleAssembler
// 红线: 引擎不做文件 IO,不渲染报表
// ==========================================

pub mod assembler;
pub mod builder;
pub mod error;
pub mod extractor;
pub mod good_lp_adapter;
pub mod hooks;
pub mod linearize;
pub mod model;
pub mod orchestrator;
pub mod solver;

// 重导出核心引擎
pub use assembler::ScheduleAssembler;
pub use builder::ModelBuilder;
pub use error::{EngineError, EngineResult, ModelBugError, UsageError};
pub use extractor::{ExtractedSolution, SolutionExtractor};
pub use good_lp_adapter::GoodLpAdapter;
pub use hooks::{CoLocatedPapers, HookContext, NoPaperConstraints, PaperConstraintHook, SessionOrder};
pub use linearize::{linearize, LinearizedModel, ProductVar};
pub use model::{
    Assignment, BuildStatistics, ConstraintFamily, ConstraintSense, LinearConstraint,
    ObjectiveSense, QipModel, QuadraticObjective, QuadraticTerm, VarFamily, VarId, VariableDef,
    VariableHandles,
};
pub use orchestrator::QipScheduler;
pub use solver::{
    NamedValue, SolutionRecord, SolveDetails, SolveOutcome, SolvedAssignment, SolverAdapter,
};
