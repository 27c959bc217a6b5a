// ==========================================
// 会议论文排程系统 - 论文专用约束扩展点
// ==========================================
// 职责: 在标准约束族之外,为具体实例追加论文级约束
// 默认: NoPaperConstraints (不追加任何约束)
// ==========================================

use crate::domain::instance::InstanceError;
use crate::domain::types::{PaperId, SessionId, Slot};
use crate::engine::error::EngineResult;
use crate::engine::model::{ConstraintFamily, ConstraintSense, LinearConstraint, QipModel, VarId};

// ==========================================
// HookContext - 扩展点可见的模型视图
// ==========================================
pub struct HookContext<'a> {
    model: &'a mut QipModel,
    session_ids: &'a [SessionId],
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(model: &'a mut QipModel, session_ids: &'a [SessionId]) -> Self {
        Self { model, session_ids }
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.model.slots().to_vec()
    }

    pub fn session_ids(&self) -> &[SessionId] {
        self.session_ids
    }

    /// x[p,slot] 句柄;论文不在实例中时报错
    pub fn paper_var(&self, paper: PaperId, slot: Slot) -> EngineResult<VarId> {
        self.model
            .handles()
            .x
            .get(&(paper, slot))
            .copied()
            .ok_or_else(|| {
                InstanceError::UnknownReference {
                    relation: "paper_constraints",
                    entity: "paper",
                    id: paper.0,
                }
                .into()
            })
    }

    /// 追加约束 (统一归入 PaperSpecific 族)
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        self.model.add_constraint(LinearConstraint::new(
            name,
            ConstraintFamily::PaperSpecific,
            terms,
            sense,
            rhs,
        ));
    }
}

// ==========================================
// Trait: PaperConstraintHook
// ==========================================
pub trait PaperConstraintHook {
    fn add_constraints(&self, ctx: &mut HookContext<'_>) -> EngineResult<()>;
}

/// 默认扩展点: 不追加约束
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaperConstraints;

impl PaperConstraintHook for NoPaperConstraints {
    fn add_constraints(&self, _ctx: &mut HookContext<'_>) -> EngineResult<()> {
        Ok(())
    }
}

// ==========================================
// CoLocatedPapers - 同组论文必须在同一 slot
// ==========================================
// 对组内相邻两篇论文,每个 slot 加 x[p1,slot] == x[p2,slot]
#[derive(Debug, Clone, Default)]
pub struct CoLocatedPapers {
    pub groups: Vec<Vec<PaperId>>,
}

impl CoLocatedPapers {
    pub fn new(groups: Vec<Vec<PaperId>>) -> Self {
        Self { groups }
    }
}

impl PaperConstraintHook for CoLocatedPapers {
    fn add_constraints(&self, ctx: &mut HookContext<'_>) -> EngineResult<()> {
        for group in &self.groups {
            let label = group
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("-");
            for pair in group.windows(2) {
                for slot in ctx.slots() {
                    let first = ctx.paper_var(pair[0], slot)?;
                    let second = ctx.paper_var(pair[1], slot)?;
                    ctx.add_constraint(
                        format!(
                            "SPECIAL_CT_PAPERIDs_{}_SESSION{}_TRACK{}",
                            label, slot.session, slot.track
                        ),
                        vec![(first, 1.0), (second, -1.0)],
                        ConstraintSense::Eq,
                        0.0,
                    );
                }
            }
        }
        Ok(())
    }
}

// ==========================================
// SessionOrder - 论文 before 必须排在 after 之前的 session
// ==========================================
// 以 session 在实例中的位置 (1 起) 为序号:
// Σ idx·x[before,·] - Σ idx·x[after,·] <= -1
#[derive(Debug, Clone, Default)]
pub struct SessionOrder {
    pub pairs: Vec<(PaperId, PaperId)>,
}

impl SessionOrder {
    pub fn new(pairs: Vec<(PaperId, PaperId)>) -> Self {
        Self { pairs }
    }
}

impl PaperConstraintHook for SessionOrder {
    fn add_constraints(&self, ctx: &mut HookContext<'_>) -> EngineResult<()> {
        for &(before, after) in &self.pairs {
            let mut terms = Vec::new();
            for slot in ctx.slots() {
                let position = ctx
                    .session_ids()
                    .iter()
                    .position(|&s| s == slot.session)
                    .map(|i| (i + 1) as f64)
                    .unwrap_or(0.0);
                terms.push((ctx.paper_var(before, slot)?, position));
                terms.push((ctx.paper_var(after, slot)?, -position));
            }
            ctx.add_constraint(
                format!("PAPER{}_BEFORE_PAPER{}", before, after),
                terms,
                ConstraintSense::Le,
                -1.0,
            );
        }
        Ok(())
    }
}
