// ==========================================
// 会议论文排程系统 - 核心库
// ==========================================
// 技术栈: Rust + good_lp (QIP 建模与求解)
// 系统定位: 论文 -> (session, track) 分配,最大化参会者兴趣
// 流程: build -> solve -> create_schedule
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、实例数据与排程结构
pub mod domain;

// 配置层 - 模型参数 / 求解器 / 运行配置
pub mod config;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 建模、求解、校验、组装
pub mod engine;

// 报表层 - 排程渲染与结果落盘
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AuthorId, BidderId, PaperDistribution, PaperId, SessionId, Slot, TopicId, TrackId,
};

// 领域实体
pub use domain::{
    InstanceData, InstanceError, PaperCatalog, PaperDetail, PaperEntry, PaperLookup, Schedule,
    SlotSchedule,
};

// 配置
pub use config::{LogFormat, ModelParameters, OutputConfig, RunConfig, SolverConfig};

// 引擎
pub use engine::{
    EngineError, EngineResult, ExtractedSolution, GoodLpAdapter, ModelBuilder, ModelBugError,
    QipModel, QipScheduler, ScheduleAssembler, SolutionExtractor, SolveDetails, SolveOutcome,
    SolverAdapter, UsageError,
};

// 导入与报表
pub use importer::{ImportError, InstanceLoader};
pub use report::{
    ConsoleScheduleRenderer, CsvScheduleRenderer, ReportError, ResultsFolder, ScheduleRenderer,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "会议论文排程系统";
