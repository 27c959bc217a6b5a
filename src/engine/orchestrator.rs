// ==========================================
// 会议论文排程系统 - 引擎编排器
// ==========================================
// 用途: 协调 构建 -> 求解 -> 提取 -> 组装 的执行顺序
// 红线:
// - 单线程顺序执行,无重试
// - 未构建先求解 / 未求解先组装 => UsageError
// - 无可行解 / 求解失败 原样上抛,不产生排程
// ==========================================

use crate::config::{ModelParameters, SolverConfig};
use crate::domain::catalog::PaperLookup;
use crate::domain::instance::InstanceData;
use crate::domain::schedule::{PaperEntry, Schedule};
use crate::engine::assembler::ScheduleAssembler;
use crate::engine::builder::ModelBuilder;
use crate::engine::error::{EngineResult, UsageError};
use crate::engine::extractor::{ExtractedSolution, SolutionExtractor};
use crate::engine::hooks::PaperConstraintHook;
use crate::engine::model::QipModel;
use crate::engine::solver::{SolutionRecord, SolveOutcome, SolverAdapter};
use tracing::{debug, info, instrument, warn};

const LOG_SEP: &str = "--------------------------------------------------------------------------------";

// ==========================================
// QipScheduler - 排程编排器
// ==========================================
pub struct QipScheduler<'a, A>
where
    A: SolverAdapter,
{
    builder: ModelBuilder<'a>,
    adapter: A,
    solver_config: SolverConfig,
    extractor: SolutionExtractor,
    assembler: ScheduleAssembler,
    outcome: Option<SolveOutcome>,
    solution: Option<ExtractedSolution>,
    schedule: Option<Schedule>,
}

impl<'a, A> QipScheduler<'a, A>
where
    A: SolverAdapter,
{
    /// 创建编排器
    ///
    /// # 参数
    /// - instance: 实例数据 (整个运行期间只读)
    /// - params: 模型参数
    /// - adapter: 求解器适配器
    /// - solver_config: 时间限制与容差
    pub fn new(
        instance: &'a InstanceData,
        params: ModelParameters,
        adapter: A,
        solver_config: SolverConfig,
    ) -> Self {
        Self {
            builder: ModelBuilder::new(instance, params),
            adapter,
            solver_config,
            extractor: SolutionExtractor::new(),
            assembler: ScheduleAssembler::new(),
            outcome: None,
            solution: None,
            schedule: None,
        }
    }

    /// 设置论文专用约束扩展 (须在 build 之前)
    pub fn with_paper_constraints(mut self, hook: impl PaperConstraintHook + 'a) -> Self {
        self.builder = self.builder.with_paper_constraints(hook);
        self
    }

    // ==========================================
    // 步骤1: 构建
    // ==========================================

    pub fn build(&mut self) -> EngineResult<&QipModel> {
        self.builder.build()
    }

    // ==========================================
    // 步骤2: 求解 + 提取
    // ==========================================

    /// 求解并校验
    ///
    /// # 错误
    /// - UsageError::NotBuilt: 尚未 build
    /// - EngineError::Infeasible / SolverFailure: 适配器结果状态
    /// - ModelBugError: 解与模型不一致
    #[instrument(skip(self), fields(solver = self.adapter.name()))]
    pub fn solve(&mut self) -> EngineResult<&ExtractedSolution> {
        let model = self.builder.model().ok_or(UsageError::NotBuilt)?;

        info!("");
        info!("SOLVE QIP");
        info!("{}", LOG_SEP);

        self.solution = None;
        self.schedule = None;

        let outcome = self.adapter.solve(model, &self.solver_config);
        log_solve_details(model, &outcome);

        let extracted = self.extractor.extract(model, &outcome, &self.solver_config);
        self.outcome = Some(outcome);
        let extracted = match extracted {
            Ok(solution) => solution,
            Err(e) => {
                warn!(error = %e, "求解未产生可用分配");
                return Err(e);
            }
        };

        log_allocation(&extracted);
        Ok(self.solution.insert(extracted))
    }

    // ==========================================
    // 步骤3: 组装排程
    // ==========================================

    /// 由已校验的解组装排程
    ///
    /// # 错误
    /// - UsageError::NotSolved: 尚无可用解
    /// - EngineError::MissingPaperMetadata: 目录缺少论文标题
    pub fn create_schedule<L>(&mut self, lookup: &L) -> EngineResult<&Schedule>
    where
        L: PaperLookup + ?Sized,
    {
        let model = self.builder.model().ok_or(UsageError::NotBuilt)?;
        let solution = self.solution.as_ref().ok_or(UsageError::NotSolved)?;

        let schedule = self.assembler.assemble(
            solution,
            model.slots(),
            self.builder.params().track_session_capacity,
            lookup,
        )?;

        log_schedule(&schedule);
        Ok(self.schedule.insert(schedule))
    }

    // ==========================================
    // 汇总与检查
    // ==========================================

    /// 输出 QIP SUMMARY 并返回同样的文本
    pub fn summary(&self) -> EngineResult<String> {
        let model = self.builder.model().ok_or(UsageError::NotBuilt)?;
        let params = self.builder.params();

        let mut lines = vec![
            "QIP SUMMARY".to_string(),
            LOG_SEP.to_string(),
            format!("Solver:{}", self.adapter.name()),
            format!("Problem:{}", model.problem_type()),
            format!("Variables:{}", model.num_variables()),
            format!("Constraints:{}", model.num_constraints()),
            format!("TrackSessionCapacity:{}", params.track_session_capacity),
            format!("PaperDistribution:{}", params.paper_distribution),
            format!(
                "Costs: bidder={} topic={} | TopicUtility={}",
                params.bidder_cost, params.topic_cost, params.topic_utility
            ),
        ];

        match (&self.outcome, &self.solution) {
            (Some(_), Some(solution)) => {
                lines.push(format!("Status:{}", solution.details.status));
                lines.push(format!("Objective Value:{}", solution.objective_value));
                lines.push(format!("Papers allocated:{}", solution.allocation.len()));
                lines.push(format!(
                    "Total attendance:{}",
                    solution.attendance.values().sum::<u32>()
                ));
            }
            (Some(outcome), None) => lines.push(format!("Status:{}", outcome.status_label())),
            (None, _) => lines.push("Status:NOT SOLVED".to_string()),
        }

        info!("");
        for line in &lines {
            info!("{}", line);
        }
        Ok(lines.join("\n"))
    }

    /// 已分配论文数;记录 "<n> Papers allocated"
    pub fn check_paper_allocation(&self) -> EngineResult<usize> {
        let solution = self.solution.as_ref().ok_or(UsageError::NotSolved)?;
        let allocated = solution.allocation.len();
        info!("{} Papers allocated", allocated);
        Ok(allocated)
    }

    // ===== 只读访问 =====

    pub fn params(&self) -> &ModelParameters {
        self.builder.params()
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver_config
    }

    pub fn model(&self) -> Option<&QipModel> {
        self.builder.model()
    }

    pub fn outcome(&self) -> Option<&SolveOutcome> {
        self.outcome.as_ref()
    }

    pub fn solution(&self) -> Option<&ExtractedSolution> {
        self.solution.as_ref()
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// 原始解记录 (仅在求解成功后可用)
    pub fn solution_record(&self) -> Option<SolutionRecord> {
        match (self.builder.model(), &self.outcome) {
            (Some(model), Some(SolveOutcome::Solved(solved))) => {
                Some(SolutionRecord::from_solved(model, solved))
            }
            _ => None,
        }
    }
}

// ==========================================
// 日志输出
// ==========================================

fn log_solve_details(model: &QipModel, outcome: &SolveOutcome) {
    info!("");
    info!("SOLVE DETAILS:");
    match outcome {
        SolveOutcome::Solved(solved) => {
            let d = &solved.details;
            info!("Problem:{}", d.problem_type);
            info!("Status:{}", d.status);
            info!("Time:{:.2} sec", d.elapsed_time);
            match d.relative_gap {
                Some(gap) => info!("Rel.Gap:{:.2}%", gap * 100.0),
                None => info!("Rel.Gap:n/a"),
            }
            match d.iteration_count {
                Some(n) => info!("N.Iter:{}", n),
                None => info!("N.Iter:n/a"),
            }
            info!("Hit Lim.:{}", d.hit_time_limit);
            info!("Objective Value:{}", d.objective_value);
        }
        SolveOutcome::Infeasible => {
            info!("Problem:{}", model.problem_type());
            info!("Status:INFEASIBLE");
        }
        SolveOutcome::Unsolved { reason } => {
            info!("Problem:{}", model.problem_type());
            info!("Status:UNSOLVED ({})", reason);
        }
    }
}

fn log_allocation(solution: &ExtractedSolution) {
    info!("");
    info!("PAPER ALLOCATION:");
    for (paper, slot) in &solution.allocation {
        info!("PaperID{} -> {}", paper, slot);
    }
    for (slot, attendance) in &solution.attendance {
        info!("{} | Attendance:{}", slot, attendance);
    }
}

fn log_schedule(schedule: &Schedule) {
    info!("");
    info!("SCHEDULE:");
    for slot in &schedule.slots {
        info!(
            "{} | Topics:{} | Attendance:{}",
            slot.slot,
            slot.topics.join("|"),
            slot.attendance
        );
        for entry in &slot.papers {
            match entry {
                PaperEntry::Paper(d) => debug!("    ID:{} {}", d.id, d.title),
                PaperEntry::Placeholder => debug!("    -"),
            }
        }
    }
}
