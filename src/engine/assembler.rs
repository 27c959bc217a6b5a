// ==========================================
// 会议论文排程系统 - 排程组装器
// ==========================================
// 职责: 分配结果 + 论文元数据 => 嵌套排程结构
// 规则:
// - slot 内论文按 id 升序
// - 主题为 slot 内论文主题的有序去重 (首次出现顺序)
// - 论文列表用占位补齐至 capacity
// - 网格内每个 slot 都出现在结果中 (含空 slot)
// ==========================================

use crate::domain::catalog::PaperLookup;
use crate::domain::schedule::{PaperDetail, PaperEntry, Schedule, SlotSchedule};
use crate::domain::types::Slot;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::extractor::ExtractedSolution;
use tracing::{debug, instrument};

pub struct ScheduleAssembler {
    // 无状态
}

impl ScheduleAssembler {
    pub fn new() -> Self {
        Self {}
    }

    /// 组装排程
    ///
    /// # 参数
    /// - solution: 已校验的解
    /// - slots: 网格全部 slot
    /// - capacity: 每个 slot 的论文位数
    /// - lookup: 论文元数据查询
    ///
    /// # 错误
    /// - EngineError::MissingPaperMetadata: 已分配论文在目录中无标题
    #[instrument(skip_all, fields(slots = slots.len(), capacity = capacity))]
    pub fn assemble<L>(
        &self,
        solution: &ExtractedSolution,
        slots: &[Slot],
        capacity: usize,
        lookup: &L,
    ) -> EngineResult<Schedule>
    where
        L: PaperLookup + ?Sized,
    {
        let mut ordered: Vec<Slot> = slots.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut result = Vec::with_capacity(ordered.len());
        for slot in ordered {
            let mut topics: Vec<String> = Vec::new();
            let mut papers = Vec::with_capacity(capacity);

            for paper in solution.papers_in(slot) {
                let title = lookup
                    .title(paper)
                    .ok_or(EngineError::MissingPaperMetadata(paper))?;
                for topic in lookup.topics(paper) {
                    if !topics.contains(topic) {
                        topics.push(topic.clone());
                    }
                }
                papers.push(PaperEntry::Paper(PaperDetail {
                    id: paper,
                    title: title.to_string(),
                    authors: lookup.authors(paper).to_vec(),
                }));
            }

            while papers.len() < capacity {
                papers.push(PaperEntry::Placeholder);
            }

            result.push(SlotSchedule {
                slot,
                topics,
                attendance: solution.attendance_at(slot),
                papers,
            });
        }

        debug!(slots = result.len(), "排程组装完成");

        Ok(Schedule {
            capacity,
            slots: result,
        })
    }
}

impl Default for ScheduleAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::PaperCatalog;
    use crate::domain::types::{PaperId, SessionId, TrackId};
    use crate::engine::model::Assignment;
    use crate::engine::solver::SolveDetails;
    use std::collections::BTreeMap;

    fn slot(j: u32, k: u32) -> Slot {
        Slot::new(SessionId(j), TrackId(k))
    }

    fn solution(allocation: &[(u32, Slot)], attendance: &[(Slot, u32)]) -> ExtractedSolution {
        ExtractedSolution {
            allocation: allocation.iter().map(|&(p, s)| (PaperId(p), s)).collect(),
            attendance: attendance.iter().copied().collect(),
            bidders_present: BTreeMap::new(),
            authors_present: BTreeMap::new(),
            active_topics: BTreeMap::new(),
            objective_value: 0.0,
            details: SolveDetails {
                problem_type: "MIQP".to_string(),
                status: "integer optimal solution".to_string(),
                elapsed_time: 0.0,
                relative_gap: None,
                iteration_count: None,
                hit_time_limit: false,
                objective_value: 0.0,
            },
            assignment: Assignment::new(vec![]),
        }
    }

    fn catalog() -> PaperCatalog {
        let mut catalog = PaperCatalog::new();
        for p in 1..=3 {
            catalog.insert(
                PaperId(p),
                format!("Paper Title {}", p),
                vec![format!("Author{}", p)],
                vec!["Topic1".to_string(), format!("Topic{}", p + 1)],
            );
        }
        catalog
    }

    #[test]
    fn test_assemble_pads_and_unions_topics() {
        let sol = solution(
            &[(2, slot(1, 1)), (1, slot(1, 1)), (3, slot(1, 2))],
            &[(slot(1, 1), 3)],
        );
        let schedule = ScheduleAssembler::new()
            .assemble(&sol, &[slot(1, 2), slot(1, 1)], 3, &catalog())
            .unwrap();

        assert_eq!(schedule.slots.len(), 2);
        let first = schedule.get(slot(1, 1)).unwrap();
        assert_eq!(first.attendance, 3);
        assert_eq!(first.topics, vec!["Topic1", "Topic2", "Topic3"]);
        let ids: Vec<_> = first.scheduled_papers().map(|d| d.id).collect();
        assert_eq!(ids, vec![PaperId(1), PaperId(2)]);
        assert_eq!(first.papers.len(), 3);
        assert!(first.papers[2].is_placeholder());

        let second = schedule.get(slot(1, 2)).unwrap();
        assert_eq!(second.attendance, 0);
        assert_eq!(second.papers.iter().filter(|p| p.is_placeholder()).count(), 2);
    }

    #[test]
    fn test_empty_slot_is_all_placeholders() {
        let sol = solution(&[(1, slot(1, 1))], &[]);
        let schedule = ScheduleAssembler::new()
            .assemble(&sol, &[slot(1, 1), slot(2, 1)], 2, &catalog())
            .unwrap();
        let empty = schedule.get(slot(2, 1)).unwrap();
        assert!(empty.topics.is_empty());
        assert!(empty.papers.iter().all(PaperEntry::is_placeholder));
    }

    #[test]
    fn test_missing_title_is_error() {
        let sol = solution(&[(9, slot(1, 1))], &[]);
        let err = ScheduleAssembler::new()
            .assemble(&sol, &[slot(1, 1)], 1, &catalog())
            .unwrap_err();
        assert_eq!(err, EngineError::MissingPaperMetadata(PaperId(9)));
    }
}
