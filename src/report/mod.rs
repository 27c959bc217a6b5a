// ==========================================
// 会议论文排程系统 - 报表层
// ==========================================
// 职责: 排程结构 -> 表格 / 文本; 运行结果落盘
// 红线: 只消费组装完成的 Schedule,不回写引擎
// ==========================================

pub mod artifacts;
pub mod console_renderer;
pub mod csv_renderer;
pub mod error;

use crate::domain::schedule::Schedule;

pub use artifacts::{ResultsFolder, RunManifest};
pub use console_renderer::ConsoleScheduleRenderer;
pub use csv_renderer::CsvScheduleRenderer;
pub use error::{ReportError, ReportResult};

// ==========================================
// Trait: ScheduleRenderer
// ==========================================
// render(schedule) -> document, 纯函数
pub trait ScheduleRenderer {
    type Output;

    fn render(&self, schedule: &Schedule) -> ReportResult<Self::Output>;
}
