// ==========================================
// 会议论文排程系统 - 配置层
// ==========================================
// 职责: 模型参数、求解器配置、运行配置
// 存储: JSON 配置文件 + 环境变量覆写
// ==========================================

pub mod model_params;
pub mod run_config;
pub mod solver_config;

// 重导出核心配置
pub use model_params::ModelParameters;
pub use run_config::{LogFormat, OutputConfig, RunConfig};
pub use solver_config::SolverConfig;
