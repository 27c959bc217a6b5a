// ==========================================
// 会议论文排程系统 - 排程结果领域模型
// ==========================================
// 职责: 组装后的 slot -> 论文列表 + 出席人数 + 主题汇总
// 红线: 每个 slot 的论文列表长度恒等于 capacity (不足用占位补齐)
// ==========================================

use crate::domain::types::{PaperId, Slot};
use serde::{Deserialize, Serialize};

// ==========================================
// PaperEntry - 单篇论文条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaperEntry {
    Paper(PaperDetail),
    Placeholder,
}

impl PaperEntry {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, PaperEntry::Placeholder)
    }

    pub fn detail(&self) -> Option<&PaperDetail> {
        match self {
            PaperEntry::Paper(detail) => Some(detail),
            PaperEntry::Placeholder => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperDetail {
    pub id: PaperId,
    pub title: String,
    pub authors: Vec<String>,
}

// ==========================================
// SlotSchedule - 单个 slot 的排程
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSchedule {
    pub slot: Slot,
    pub topics: Vec<String>, // 有序去重,按首次出现顺序
    pub attendance: u32,     // 出席投标者人数
    pub papers: Vec<PaperEntry>,
}

impl SlotSchedule {
    /// 已安排论文 (不含占位)
    pub fn scheduled_papers(&self) -> impl Iterator<Item = &PaperDetail> {
        self.papers.iter().filter_map(PaperEntry::detail)
    }
}

// ==========================================
// Schedule - 完整排程
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub capacity: usize,
    pub slots: Vec<SlotSchedule>, // 按 slot 升序
}

impl Schedule {
    pub fn get(&self, slot: Slot) -> Option<&SlotSchedule> {
        self.slots
            .binary_search_by(|s| s.slot.cmp(&slot))
            .ok()
            .map(|idx| &self.slots[idx])
    }

    /// 论文所在 slot
    pub fn slot_of(&self, paper: PaperId) -> Option<Slot> {
        self.slots
            .iter()
            .find(|s| s.scheduled_papers().any(|d| d.id == paper))
            .map(|s| s.slot)
    }

    pub fn scheduled_paper_count(&self) -> usize {
        self.slots.iter().map(|s| s.scheduled_papers().count()).sum()
    }
}
