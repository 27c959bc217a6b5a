// ==========================================
// 会议论文排程系统 - good_lp 求解适配器
// ==========================================
// 职责: SolverAdapter 的 good_lp 实现 (默认后端 microlp, 纯 Rust)
// 流程: 线性化 -> 建 good_lp 模型 -> 求解 -> 按整数容差取整
// 说明:
// - 时间限制: 求解在工作线程执行,主线程最多等待 time_limit
//   超时即返回 Unsolved (该后端不提供中间可行解)
// - 报告的目标值取自后端 (线性化模型),由提取器与原双线性目标对账
// - mip_relative_gap / feasibility_tolerance 不被该后端接受,仅记录警告
// ==========================================

use crate::config::SolverConfig;
use crate::engine::linearize::{linearize, LinearizedModel};
use crate::engine::model::{Assignment, ConstraintSense, ObjectiveSense, QipModel};
use crate::engine::solver::{SolveDetails, SolveOutcome, SolvedAssignment, SolverAdapter};
use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// 后端原始结果
#[derive(Debug)]
enum RawOutcome {
    Optimal { values: Vec<f64>, objective: f64 },
    Infeasible,
    Failed(String),
    TimedOut,
}

// ==========================================
// GoodLpAdapter
// ==========================================
pub struct GoodLpAdapter {
    // 无状态
}

impl GoodLpAdapter {
    pub fn new() -> Self {
        Self {}
    }

    fn log_ignored_settings(&self, config: &SolverConfig) {
        if let Some(gap) = config.mip_relative_gap {
            warn!(mip_relative_gap = gap, "后端不支持相对间隙设置,已忽略");
        }
        if let Some(tol) = config.feasibility_tolerance {
            warn!(feasibility_tolerance = tol, "后端不支持可行性容差设置,已忽略");
        }
    }
}

impl Default for GoodLpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverAdapter for GoodLpAdapter {
    fn name(&self) -> &str {
        "good_lp/microlp"
    }

    #[instrument(skip_all, fields(
        model = model.name(),
        variables = model.num_variables(),
        constraints = model.num_constraints()
    ))]
    fn solve(&self, model: &QipModel, config: &SolverConfig) -> SolveOutcome {
        self.log_ignored_settings(config);

        let linearize_start = Instant::now();
        let linear = linearize(model);
        if config.verbose_solver_log {
            info!(
                variables = linear.num_variables(),
                product_variables = linear.products.len(),
                constraints = linear.constraints.len(),
                linearization_constraints = linear.num_linearization_constraints(),
                objective_terms = linear.objective.len(),
                elapsed_ms = linearize_start.elapsed().as_millis() as u64,
                "线性化完成"
            );
        }

        let time_limit = config.time_limit();
        let started = Instant::now();
        let raw = match time_limit {
            Some(limit) => run_with_time_limit(move || solve_linear(&linear), limit)
                .unwrap_or_else(|interrupted| interrupted),
            None => solve_linear(&linear),
        };
        let elapsed = started.elapsed();

        if config.verbose_solver_log {
            info!(elapsed_ms = elapsed.as_millis() as u64, "后端求解返回");
        }

        into_outcome(model, raw, config, elapsed)
    }
}

/// 后端原始结果 -> SolveOutcome
fn into_outcome(
    model: &QipModel,
    raw: RawOutcome,
    config: &SolverConfig,
    elapsed: Duration,
) -> SolveOutcome {
    match raw {
        RawOutcome::Optimal { values, objective } => round_solution(
            model,
            &values,
            objective,
            config.integrality_tolerance(),
            elapsed,
        ),
        RawOutcome::Infeasible => SolveOutcome::Infeasible,
        RawOutcome::Failed(reason) => SolveOutcome::Unsolved { reason },
        RawOutcome::TimedOut => {
            let seconds = config
                .time_limit()
                .map(|d| d.as_secs_f64())
                .unwrap_or_default();
            warn!(time_limit_seconds = seconds, "求解超时,后端无可用的中间解");
            SolveOutcome::Unsolved {
                reason: format!(
                    "time limit of {:.1}s reached without an incumbent",
                    seconds
                ),
            }
        }
    }
}

// ==========================================
// 求解
// ==========================================

/// 在工作线程执行 job,最多等待 limit
///
/// 工作线程沿用调用方的 tracing dispatcher (运行日志)。
/// 超时后工作线程不会被中断,会继续占用 CPU 直到后端返回,结果被丢弃。
/// Err 为 TimedOut 或 Failed
fn run_with_time_limit<T, F>(job: F, limit: Duration) -> Result<T, RawOutcome>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("qip-solver".to_string())
        .spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || {
                let _ = tx.send(job());
            })
        });
    if let Err(e) = spawned {
        return Err(RawOutcome::Failed(format!(
            "failed to spawn solver thread: {}",
            e
        )));
    }

    match rx.recv_timeout(limit) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => Err(RawOutcome::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Err(RawOutcome::Failed(
            "solver thread terminated without a result".to_string(),
        )),
    }
}

/// 构建 good_lp 模型并求解
fn solve_linear(linear: &LinearizedModel) -> RawOutcome {
    let mut problem_vars = ProblemVariables::new();
    let vars: Vec<Variable> = linear
        .variable_names
        .iter()
        .map(|name| problem_vars.add(variable().binary().name(name.clone())))
        .collect();

    let objective: Expression = linear
        .objective
        .iter()
        .map(|&(v, coef)| coef * vars[v.index()])
        .sum::<Expression>()
        + linear.constant;

    let mut problem = match linear.sense {
        ObjectiveSense::Maximize => problem_vars.maximise(objective.clone()),
        ObjectiveSense::Minimize => problem_vars.minimise(objective.clone()),
    }
    .using(default_solver);

    for c in &linear.constraints {
        let lhs: Expression = c
            .terms
            .iter()
            .map(|&(v, coef)| coef * vars[v.index()])
            .sum();
        let rhs = c.rhs;
        problem = match c.sense {
            ConstraintSense::Eq => problem.with(constraint!(lhs == rhs)),
            ConstraintSense::Le => problem.with(constraint!(lhs <= rhs)),
            ConstraintSense::Ge => problem.with(constraint!(lhs >= rhs)),
        };
    }

    debug!(
        variables = vars.len(),
        constraints = linear.constraints.len(),
        "good_lp 模型已提交"
    );

    match problem.solve() {
        Ok(solution) => RawOutcome::Optimal {
            values: vars.iter().map(|&v| solution.value(v)).collect(),
            objective: solution.eval(objective),
        },
        Err(ResolutionError::Infeasible) => RawOutcome::Infeasible,
        Err(e) => RawOutcome::Failed(e.to_string()),
    }
}

/// 将后端取值按整数容差取整为原模型的 0/1 赋值
///
/// objective_value 原样报告后端目标值,不在此处重算
fn round_solution(
    model: &QipModel,
    values: &[f64],
    backend_objective: f64,
    tolerance: f64,
    elapsed: Duration,
) -> SolveOutcome {
    let mut bits = Vec::with_capacity(model.num_variables());
    for (idx, def) in model.variables().iter().enumerate() {
        let value = values.get(idx).copied().unwrap_or(0.0);
        if (value - 1.0).abs() <= tolerance {
            bits.push(true);
        } else if value.abs() <= tolerance {
            bits.push(false);
        } else {
            return SolveOutcome::Unsolved {
                reason: format!("variable {} is not integral: {}", def.name, value),
            };
        }
    }

    SolveOutcome::Solved(SolvedAssignment {
        assignment: Assignment::new(bits),
        details: SolveDetails {
            problem_type: model.problem_type().to_string(),
            status: "integer optimal solution".to_string(),
            elapsed_time: elapsed.as_secs_f64(),
            relative_gap: Some(0.0),
            iteration_count: None,
            hit_time_limit: false,
            objective_value: backend_objective,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{SessionId, Slot, TrackId};
    use crate::engine::error::{EngineError, ModelBugError};
    use crate::engine::extractor::SolutionExtractor;
    use crate::engine::model::{
        ConstraintFamily, LinearConstraint, QuadraticObjective, QuadraticTerm, VarFamily,
    };

    // x1 + x2 == 1, max 3·x1·y - y + 2·x2
    fn tiny_model() -> QipModel {
        let slot = Slot::new(SessionId(1), TrackId(1));
        let mut model = QipModel::new("QIP", vec![slot]);
        let x1 = model.add_variable(VarFamily::Paper, 1, slot);
        let x2 = model.add_variable(VarFamily::Paper, 2, slot);
        let y = model.add_variable(VarFamily::Bidder, 1, slot);
        model.add_constraint(LinearConstraint::new(
            "ONE",
            ConstraintFamily::Allocation,
            vec![(x1, 1.0), (x2, 1.0)],
            ConstraintSense::Eq,
            1.0,
        ));
        model.set_objective(
            QuadraticObjective {
                linear: vec![(y, -1.0), (x2, 2.0)],
                quadratic: vec![QuadraticTerm {
                    left: x1,
                    right: y,
                    coefficient: 3.0,
                }],
                constant: 0.0,
            },
            ObjectiveSense::Maximize,
        );
        model
    }

    #[test]
    fn test_solves_bilinear_model_to_optimum() {
        let model = tiny_model();
        let outcome = GoodLpAdapter::new().solve(&model, &SolverConfig::default());
        match outcome {
            SolveOutcome::Solved(solved) => {
                // x2=1 得 2; x1=1,y=1 得 3-1=2; 两者等值
                assert!((solved.details.objective_value - 2.0).abs() < 1e-6);
                assert_eq!(solved.assignment.len(), 3);
                assert_eq!(solved.details.problem_type, "MIQP");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_contradictory_constraints_are_infeasible() {
        let mut model = tiny_model();
        let x1 = model.handles().x.values().next().copied().unwrap();
        model.add_constraint(LinearConstraint::new(
            "X1_ZERO",
            ConstraintFamily::Conflict,
            vec![(x1, 1.0)],
            ConstraintSense::Eq,
            0.0,
        ));
        model.add_constraint(LinearConstraint::new(
            "X1_ONE",
            ConstraintFamily::PaperSpecific,
            vec![(x1, 1.0)],
            ConstraintSense::Eq,
            1.0,
        ));
        let outcome = GoodLpAdapter::new().solve(&model, &SolverConfig::default());
        assert_eq!(outcome, SolveOutcome::Infeasible);
    }

    #[test]
    fn test_solve_with_time_limit_returns_result() {
        let model = tiny_model();
        let config = SolverConfig {
            time_limit_seconds: Some(30.0),
            ..Default::default()
        };
        let outcome = GoodLpAdapter::new().solve(&model, &config);
        assert_eq!(outcome.status_label(), "SOLVED");
    }

    #[test]
    fn test_fractional_value_is_unsolved() {
        let model = tiny_model();
        let outcome = round_solution(&model, &[0.5, 0.5, 0.0], 2.0, 1e-5, Duration::ZERO);
        assert!(matches!(outcome, SolveOutcome::Unsolved { .. }));
    }

    // ==========================================
    // 目标值对账
    // ==========================================

    // x == 1, max 3·x·y - 2·y; 最优 x=1,y=0 得 0
    fn single_paper_model() -> QipModel {
        let slot = Slot::new(SessionId(1), TrackId(1));
        let mut model = QipModel::new("QIP", vec![slot]);
        let x = model.add_variable(VarFamily::Paper, 1, slot);
        let y = model.add_variable(VarFamily::Bidder, 1, slot);
        model.add_constraint(LinearConstraint::new(
            "PAPER1_IS_ALLOCATED",
            ConstraintFamily::Allocation,
            vec![(x, 1.0)],
            ConstraintSense::Eq,
            1.0,
        ));
        model.set_objective(
            QuadraticObjective {
                linear: vec![(y, -2.0)],
                quadratic: vec![QuadraticTerm {
                    left: x,
                    right: y,
                    coefficient: 3.0,
                }],
                constant: 0.0,
            },
            ObjectiveSense::Maximize,
        );
        model
    }

    #[test]
    fn test_reported_objective_comes_from_backend() {
        let model = single_paper_model();
        let outcome = GoodLpAdapter::new().solve(&model, &SolverConfig::default());
        let extracted = SolutionExtractor::new()
            .extract(&model, &outcome, &SolverConfig::default())
            .unwrap();
        assert!(extracted.details.objective_value.abs() < 1e-6);
        assert_eq!(extracted.objective_value, 0.0);
    }

    #[test]
    fn test_broken_linearization_surfaces_objective_mismatch() {
        let model = single_paper_model();
        // 去掉 w <= right 后, w=1,y=0 的虚假乘积使后端目标为 3
        let mut linear = linearize(&model);
        linear.constraints.retain(|c| !c.name.ends_with("_LE_RIGHT"));

        let raw = solve_linear(&linear);
        let config = SolverConfig::default();
        let outcome = into_outcome(&model, raw, &config, Duration::ZERO);
        match &outcome {
            SolveOutcome::Solved(solved) => {
                assert!((solved.details.objective_value - 3.0).abs() < 1e-6)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        match SolutionExtractor::new().extract(&model, &outcome, &config) {
            Err(EngineError::ModelBug(ModelBugError::ObjectiveMismatch {
                reported,
                recomputed,
            })) => {
                assert!((reported - 3.0).abs() < 1e-6);
                assert_eq!(recomputed, 0.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    // ==========================================
    // 时间限制
    // ==========================================

    #[test]
    fn test_slow_job_times_out() {
        let result = run_with_time_limit(
            || {
                thread::sleep(Duration::from_millis(500));
                RawOutcome::Infeasible
            },
            Duration::from_millis(20),
        );
        assert!(matches!(result, Err(RawOutcome::TimedOut)));
    }

    #[test]
    fn test_timed_out_is_unsolved_without_incumbent() {
        let model = tiny_model();
        let config = SolverConfig {
            time_limit_seconds: Some(0.5),
            ..Default::default()
        };
        let outcome = into_outcome(&model, RawOutcome::TimedOut, &config, Duration::ZERO);
        let reason = match &outcome {
            SolveOutcome::Unsolved { reason } => reason.clone(),
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert!(reason.starts_with("time limit of 0.5s"));
        assert!(reason.ends_with("without an incumbent"));

        assert_eq!(
            SolutionExtractor::new()
                .extract(&model, &outcome, &config)
                .unwrap_err(),
            EngineError::SolverFailure { reason }
        );
    }

    #[test]
    fn test_worker_thread_uses_caller_dispatcher() {
        let result = tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            run_with_time_limit(
                || tracing::dispatcher::get_default(|d| d.is::<tracing_subscriber::Registry>()),
                Duration::from_secs(30),
            )
        });
        assert!(matches!(result, Ok(true)));
    }
}
