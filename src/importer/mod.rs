// ==========================================
// 会议论文排程系统 - 导入层
// ==========================================
// 职责: 外部输入 (实例数据、论文目录、运行配置) 的读取与校验
// ==========================================

pub mod error;
pub mod instance_loader;

pub use error::{ImportError, ImportResult};
pub use instance_loader::InstanceLoader;
