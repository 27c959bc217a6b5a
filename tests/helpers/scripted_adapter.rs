// ==========================================
// 脚本化求解适配器 - 用于集成测试
// ==========================================
// 按预设返回结果,不做任何求解;用于验证
// 编排器对 Infeasible / Unsolved / 错误赋值 的处理

use conference_scheduler::config::SolverConfig;
use conference_scheduler::engine::model::{Assignment, QipModel};
use conference_scheduler::engine::solver::{
    SolveDetails, SolveOutcome, SolvedAssignment, SolverAdapter,
};
use std::cell::Cell;

pub enum Script {
    /// 固定结果
    Outcome(SolveOutcome),
    /// 由模型计算赋值,目标值按模型重算
    Assign(Box<dyn Fn(&QipModel) -> Vec<bool>>),
    /// 由模型计算赋值,报告给定目标值
    AssignWithObjective(Box<dyn Fn(&QipModel) -> Vec<bool>>, f64),
}

pub struct ScriptedAdapter {
    script: Script,
    calls: Cell<usize>,
}

impl ScriptedAdapter {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Cell::new(0),
        }
    }

    pub fn infeasible() -> Self {
        Self::new(Script::Outcome(SolveOutcome::Infeasible))
    }

    pub fn unsolved(reason: &str) -> Self {
        Self::new(Script::Outcome(SolveOutcome::Unsolved {
            reason: reason.to_string(),
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SolverAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(&self, model: &QipModel, _config: &SolverConfig) -> SolveOutcome {
        self.calls.set(self.calls.get() + 1);
        let (bits, reported) = match &self.script {
            Script::Outcome(outcome) => return outcome.clone(),
            Script::Assign(f) => (f(model), None),
            Script::AssignWithObjective(f, objective) => (f(model), Some(*objective)),
        };
        let assignment = Assignment::new(bits);
        let objective_value =
            reported.unwrap_or_else(|| model.objective().evaluate(|v| assignment.value(v)));
        SolveOutcome::Solved(SolvedAssignment {
            assignment,
            details: SolveDetails {
                problem_type: model.problem_type().to_string(),
                status: "scripted".to_string(),
                elapsed_time: 0.0,
                relative_gap: None,
                iteration_count: Some(0),
                hit_time_limit: false,
                objective_value,
            },
        })
    }
}
