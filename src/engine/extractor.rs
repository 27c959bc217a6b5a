// ==========================================
// 会议论文排程系统 - 解提取器
// ==========================================
// 职责: 校验并解码求解器赋值
// 输出: 论文 -> slot 分配, 每个 slot 的出席人数与出席集合
// 红线:
// - 论文未被恰好分配一次 => ModelBugError (不修正)
// - 任一约束在取值回放下不满足 => ModelBugError
// - 无可行解 / 求解失败 => 原样上抛,不产生分配
// ==========================================

use crate::config::SolverConfig;
use crate::domain::types::{AuthorId, BidderId, PaperId, Slot, TopicId};
use crate::engine::error::{EngineError, EngineResult, ModelBugError};
use crate::engine::model::{Assignment, QipModel, VarId};
use crate::engine::solver::{SolveDetails, SolveOutcome, SolvedAssignment};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// 目标值比较的相对容差
const OBJECTIVE_RELATIVE_TOLERANCE: f64 = 1e-6;

// ==========================================
// ExtractedSolution - 解码后的解
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSolution {
    pub allocation: BTreeMap<PaperId, Slot>,
    /// slot -> Σ_b y[b,slot]
    pub attendance: BTreeMap<Slot, u32>,
    pub bidders_present: BTreeMap<Slot, Vec<BidderId>>,
    pub authors_present: BTreeMap<Slot, Vec<AuthorId>>,
    pub active_topics: BTreeMap<Slot, Vec<TopicId>>,
    /// 由赋值独立重算的目标值
    pub objective_value: f64,
    pub details: SolveDetails,
    pub assignment: Assignment,
}

impl ExtractedSolution {
    pub fn slot_of(&self, paper: PaperId) -> Option<Slot> {
        self.allocation.get(&paper).copied()
    }

    /// slot 内的论文 (按论文 id 升序)
    pub fn papers_in(&self, slot: Slot) -> Vec<PaperId> {
        self.allocation
            .iter()
            .filter(|(_, s)| **s == slot)
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn attendance_at(&self, slot: Slot) -> u32 {
        self.attendance.get(&slot).copied().unwrap_or(0)
    }
}

// ==========================================
// SolutionExtractor
// ==========================================
pub struct SolutionExtractor {
    // 无状态
}

impl SolutionExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// 提取解
    ///
    /// # 错误
    /// - EngineError::Infeasible / SolverFailure: 适配器未给出赋值
    /// - ModelBugError: 赋值与模型不一致
    #[instrument(skip_all, fields(status = outcome.status_label()))]
    pub fn extract(
        &self,
        model: &QipModel,
        outcome: &SolveOutcome,
        config: &SolverConfig,
    ) -> EngineResult<ExtractedSolution> {
        let solved = match outcome {
            SolveOutcome::Solved(solved) => solved,
            SolveOutcome::Infeasible => return Err(EngineError::Infeasible),
            SolveOutcome::Unsolved { reason } => {
                return Err(EngineError::SolverFailure {
                    reason: reason.clone(),
                })
            }
        };

        if solved.assignment.len() != model.num_variables() {
            return Err(ModelBugError::AssignmentSizeMismatch {
                expected: model.num_variables(),
                actual: solved.assignment.len(),
            }
            .into());
        }

        let allocation = self.decode_allocation(model, &solved.assignment)?;
        self.replay_constraints(model, &solved.assignment, config.feasibility_tolerance())?;
        let objective_value = self.check_objective(model, solved, config.feasibility_tolerance())?;

        let assignment = &solved.assignment;
        let handles = model.handles();
        let bidders_present = present_by_slot(model, handles.y.iter(), assignment);
        let authors_present = present_by_slot(model, handles.z.iter(), assignment);
        let active_topics = present_by_slot(model, handles.q.iter(), assignment);
        let attendance = model
            .slots()
            .iter()
            .map(|&slot| {
                let count = bidders_present.get(&slot).map_or(0, |b| b.len());
                (slot, count as u32)
            })
            .collect();

        debug!(
            papers = allocation.len(),
            objective = objective_value,
            "解提取完成"
        );

        Ok(ExtractedSolution {
            allocation,
            attendance,
            bidders_present,
            authors_present,
            active_topics,
            objective_value,
            details: solved.details.clone(),
            assignment: solved.assignment.clone(),
        })
    }

    /// x -> 论文分配;每篇论文必须恰好一个 slot
    fn decode_allocation(
        &self,
        model: &QipModel,
        assignment: &Assignment,
    ) -> EngineResult<BTreeMap<PaperId, Slot>> {
        let mut chosen: BTreeMap<PaperId, Vec<Slot>> = BTreeMap::new();
        for (&(paper, slot), &var) in &model.handles().x {
            let entry = chosen.entry(paper).or_default();
            if assignment.get(var) {
                entry.push(slot);
            }
        }

        let mut allocation = BTreeMap::new();
        for (paper, slots) in chosen {
            if slots.len() != 1 {
                return Err(ModelBugError::PaperNotAllocated { paper, slots }.into());
            }
            allocation.insert(paper, slots[0]);
        }
        Ok(allocation)
    }

    /// 逐条回放约束
    fn replay_constraints(
        &self,
        model: &QipModel,
        assignment: &Assignment,
        tolerance: f64,
    ) -> EngineResult<()> {
        for c in model.constraints() {
            let lhs = c.lhs(|v| assignment.value(v));
            if !c.is_satisfied_by(lhs, tolerance) {
                return Err(ModelBugError::ConstraintViolated {
                    name: c.name.clone(),
                    lhs,
                    sense: c.sense.to_string(),
                    rhs: c.rhs,
                }
                .into());
            }
        }
        Ok(())
    }

    /// 由赋值重算双线性目标,与适配器报告值比较
    fn check_objective(
        &self,
        model: &QipModel,
        solved: &SolvedAssignment,
        feasibility_tolerance: f64,
    ) -> EngineResult<f64> {
        let reported = solved.details.objective_value;
        let recomputed = model
            .objective()
            .evaluate(|v| solved.assignment.value(v));
        let tolerance =
            OBJECTIVE_RELATIVE_TOLERANCE * reported.abs().max(1.0) + feasibility_tolerance;
        if (reported - recomputed).abs() > tolerance {
            return Err(ModelBugError::ObjectiveMismatch {
                reported,
                recomputed,
            }
            .into());
        }
        Ok(recomputed)
    }
}

impl Default for SolutionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 按 slot 收集取值为 1 的实体
fn present_by_slot<'m, K, I>(
    model: &QipModel,
    handles: I,
    assignment: &Assignment,
) -> BTreeMap<Slot, Vec<K>>
where
    K: Copy + 'm,
    I: Iterator<Item = (&'m (K, Slot), &'m VarId)>,
{
    let mut present: BTreeMap<Slot, Vec<K>> =
        model.slots().iter().map(|&s| (s, Vec::new())).collect();
    for (&(entity, slot), &var) in handles {
        if assignment.get(var) {
            present.entry(slot).or_default().push(entity);
        }
    }
    present
}
