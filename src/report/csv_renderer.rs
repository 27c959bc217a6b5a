// ==========================================
// 会议论文排程系统 - CSV 排程表
// ==========================================
// 表格布局 (每个 session 一组行):
//   SESSION | ROW    | TRACK 1 | TRACK 2 | ...
//   SESSION1| Topics | T1|T2| *ATTENDANCE:n*
//   SESSION1| Paper1 | ID: ..\nTitle: ..\nAuthors: a, b
// ==========================================

use crate::domain::schedule::{PaperEntry, Schedule, SlotSchedule};
use crate::domain::types::{SessionId, Slot, TrackId};
use crate::report::error::{ReportError, ReportResult};
use crate::report::ScheduleRenderer;
use std::collections::BTreeSet;
use std::path::Path;

pub struct CsvScheduleRenderer {
    // 无状态
}

impl CsvScheduleRenderer {
    pub fn new() -> Self {
        Self {}
    }

    /// 表格行 (含表头)
    pub fn rows(&self, schedule: &Schedule) -> Vec<Vec<String>> {
        let sessions: BTreeSet<SessionId> = schedule.slots.iter().map(|s| s.slot.session).collect();
        let tracks: BTreeSet<TrackId> = schedule.slots.iter().map(|s| s.slot.track).collect();

        let mut header = vec!["SESSION".to_string(), "ROW".to_string()];
        header.extend(tracks.iter().map(|k| format!("TRACK {}", k)));
        let mut rows = vec![header];

        for &j in &sessions {
            let cells = |f: &dyn Fn(&SlotSchedule) -> String| -> Vec<String> {
                tracks
                    .iter()
                    .map(|&k| schedule.get(Slot::new(j, k)).map(f).unwrap_or_default())
                    .collect()
            };

            let mut topics_row = vec![format!("SESSION{}", j), "Topics".to_string()];
            topics_row.extend(cells(&topics_cell));
            rows.push(topics_row);

            for idx in 0..schedule.capacity {
                let mut row = vec![format!("SESSION{}", j), format!("Paper{}", idx + 1)];
                row.extend(cells(&|s: &SlotSchedule| {
                    paper_cell(s.papers.get(idx).unwrap_or(&PaperEntry::Placeholder))
                }));
                rows.push(row);
            }
        }
        rows
    }

    /// 直接写出到文件
    pub fn write_to(&self, schedule: &Schedule, path: &Path) -> ReportResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.rows(schedule) {
            writer.write_record(&row)?;
        }
        writer.flush().map_err(|e| ReportError::io(path, e))
    }
}

impl Default for CsvScheduleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRenderer for CsvScheduleRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule) -> ReportResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in self.rows(schedule) {
            writer.write_record(&row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Csv(csv::Error::from(e.into_error())))?;
        String::from_utf8(bytes).map_err(|e| ReportError::Encoding(e.to_string()))
    }
}

/// 主题行: 主题以 | 连接,末尾附出席人数
fn topics_cell(slot: &SlotSchedule) -> String {
    let mut parts = slot.topics.clone();
    parts.push(format!(" *ATTENDANCE:{}*", slot.attendance));
    parts.join("|")
}

fn paper_cell(entry: &PaperEntry) -> String {
    match entry {
        PaperEntry::Paper(d) => format!(
            "ID: {}\nTitle: {}\nAuthors: {}",
            d.id,
            d.title,
            d.authors.join(", ")
        ),
        PaperEntry::Placeholder => "ID: \nTitle: \nAuthors: ".to_string(),
    }
}
