// ==========================================
// 会议论文排程系统 - 控制台排程清单
// ==========================================

use crate::domain::schedule::{PaperEntry, Schedule};
use crate::report::error::ReportResult;
use crate::report::ScheduleRenderer;

pub struct ConsoleScheduleRenderer {
    // 无状态
}

impl ConsoleScheduleRenderer {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for ConsoleScheduleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRenderer for ConsoleScheduleRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule) -> ReportResult<String> {
        let rule = "-".repeat(60);
        let mut lines = Vec::new();
        for (i, slot) in schedule.slots.iter().enumerate() {
            lines.push(format!(
                "SESSION:{} TRACK:{} ATTENDANCE:{} (Subsession:{})",
                slot.slot.session,
                slot.slot.track,
                slot.attendance,
                i + 1
            ));
            lines.push(rule.clone());
            lines.push("TOPICS:".to_string());
            lines.push(slot.topics.join("|"));
            lines.push(String::new());
            lines.push("PAPERS:".to_string());
            for entry in &slot.papers {
                match entry {
                    PaperEntry::Paper(d) => {
                        lines.push(format!("ID:{}", d.id));
                        lines.push(format!("Title:{}", d.title));
                        lines.push(format!("Authors:{}", d.authors.join(", ")));
                    }
                    PaperEntry::Placeholder => {
                        lines.push("ID:".to_string());
                        lines.push("Title:".to_string());
                        lines.push("Authors:".to_string());
                    }
                }
                lines.push(String::new());
            }
            lines.push(rule.clone());
            lines.push(String::new());
        }
        Ok(lines.join("\n"))
    }
}
