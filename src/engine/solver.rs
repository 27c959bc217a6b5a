// ==========================================
// 会议论文排程系统 - 求解器适配接口
// ==========================================
// 职责: 定义模型求解的外部协作者契约
// 说明: Engine 层定义 trait, 具体后端 (good_lp 等) 实现适配器
// 红线: 适配器内部搜索策略对其余组件不可见,可整体替换
// ==========================================

use crate::config::SolverConfig;
use crate::engine::model::{Assignment, QipModel};
use serde::{Deserialize, Serialize};

// ==========================================
// 求解结果
// ==========================================

/// 求解明细 (对外输出为 qip_solve_details)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveDetails {
    pub problem_type: String,
    pub status: String,
    /// 求解耗时 (秒)
    pub elapsed_time: f64,
    pub relative_gap: Option<f64>,
    pub iteration_count: Option<u64>,
    pub hit_time_limit: bool,
    pub objective_value: f64,
}

/// 已求解: 每个模型变量的 0/1 取值 + 求解明细
///
/// 可能是时间限制下的可行解 (非最优),由 hit_time_limit / relative_gap 标识
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedAssignment {
    pub assignment: Assignment,
    pub details: SolveDetails,
}

/// 适配器返回的三种结果
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Solved(SolvedAssignment),
    /// 当前约束下无可行解
    Infeasible,
    /// 求解器失败 (资源耗尽、内部错误),区别于无可行解
    Unsolved { reason: String },
}

impl SolveOutcome {
    pub fn status_label(&self) -> &'static str {
        match self {
            SolveOutcome::Solved(_) => "SOLVED",
            SolveOutcome::Infeasible => "INFEASIBLE",
            SolveOutcome::Unsolved { .. } => "UNSOLVED",
        }
    }
}

// ==========================================
// Trait: SolverAdapter
// ==========================================
// 阻塞调用;时间上限由适配器按 SolverConfig::time_limit() 自行遵守
pub trait SolverAdapter {
    /// 后端名称 (日志用)
    fn name(&self) -> &str;

    fn solve(&self, model: &QipModel, config: &SolverConfig) -> SolveOutcome;
}

impl<T: SolverAdapter + ?Sized> SolverAdapter for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &QipModel, config: &SolverConfig) -> SolveOutcome {
        (**self).solve(model, config)
    }
}

// ==========================================
// SolutionRecord - 原始解记录
// ==========================================
// 目标值 + 取值非零的命名变量 (对外输出为 qip_solution)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub model: String,
    pub objective_value: f64,
    pub variables: Vec<NamedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

impl SolutionRecord {
    pub fn from_solved(model: &QipModel, solved: &SolvedAssignment) -> Self {
        let variables = solved
            .assignment
            .ones()
            .filter(|v| v.index() < model.num_variables())
            .map(|v| NamedValue {
                name: model.variable(v).name.clone(),
                value: 1.0,
            })
            .collect();
        Self {
            model: model.name().to_string(),
            objective_value: solved.details.objective_value,
            variables,
        }
    }
}
