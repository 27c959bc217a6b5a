// ==========================================
// 会议论文排程系统 - QIP 模型构建器
// ==========================================
// 职责: 由 InstanceData 生成决策变量、约束族与目标函数
// 输入: 实例数据 + 模型参数 (+ 可选论文专用约束扩展)
// 输出: 不可变 QipModel
// 红线: 一次性构建,重复 build() 为调用错误
// ==========================================
// 约束族:
// 1) Allocation        每篇论文恰好一个 slot
// 2) Capacity          每个 slot == / <= capacity
// 3) Conflict          论文不得进入冲突 session 的任一 track
// 4) BidderExclusivity 投标者每个 session 至多一个 track
// 5) AuthorLinkage     受约束作者必须出席其论文所在 slot
// 6) AuthorExclusivity 受约束作者每个 session 至多一个 track
// 7) TopicExclusivity  主题每个 session 至多在一个 track 激活
// ==========================================

use crate::config::ModelParameters;
use crate::domain::instance::InstanceData;
use crate::domain::types::{PaperDistribution, Slot};
use crate::engine::error::{EngineResult, UsageError};
use crate::engine::hooks::{HookContext, NoPaperConstraints, PaperConstraintHook};
use crate::engine::model::{
    ConstraintFamily, ConstraintSense, LinearConstraint, ObjectiveSense, QipModel,
    QuadraticObjective, QuadraticTerm, VarFamily, VarId,
};
use tracing::{debug, info, instrument};

const LOG_SEP: &str = "--------------------------------------------------------------------------------";

// ==========================================
// ModelBuilder - 模型构建器
// ==========================================
pub struct ModelBuilder<'a> {
    instance: &'a InstanceData,
    params: ModelParameters,
    hook: Box<dyn PaperConstraintHook + 'a>,
    model: Option<QipModel>,
}

impl<'a> ModelBuilder<'a> {
    /// 创建构建器
    ///
    /// # 参数
    /// - instance: 实例数据 (只读借用)
    /// - params: 模型参数
    pub fn new(instance: &'a InstanceData, params: ModelParameters) -> Self {
        Self {
            instance,
            params,
            hook: Box::new(NoPaperConstraints),
            model: None,
        }
    }

    /// 设置论文专用约束扩展
    pub fn with_paper_constraints(mut self, hook: impl PaperConstraintHook + 'a) -> Self {
        self.hook = Box::new(hook);
        self
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn is_built(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&QipModel> {
        self.model.as_ref()
    }

    pub fn into_model(self) -> Option<QipModel> {
        self.model
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 构建 QIP 模型
    ///
    /// # 错误
    /// - UsageError::AlreadyBuilt: 重复调用
    /// - UsageError::InvalidParameter: 参数非法
    /// - EngineError::Instance: 实例数据不一致
    #[instrument(skip(self), fields(
        papers = self.instance.paper_ids.len(),
        slots = self.instance.session_ids.len() * self.instance.track_ids.len()
    ))]
    pub fn build(&mut self) -> EngineResult<&QipModel> {
        if self.model.is_some() {
            return Err(UsageError::AlreadyBuilt.into());
        }
        self.params.validate()?;
        self.instance.validate()?;

        self.log_input_info();

        info!("");
        info!("BUILD QIP");
        info!("{}", LOG_SEP);

        let mut model = QipModel::new("QIP", self.instance.slots());

        self.define_variables(&mut model);
        self.add_paper_constraints(&mut model)?;
        self.add_bidder_constraints(&mut model);
        self.add_author_constraints(&mut model);
        self.add_topic_constraints(&mut model);
        self.add_objective(&mut model);

        info!("Successfully Built QIP");
        log_build_details(&model);

        Ok(self.model.insert(model))
    }

    fn log_input_info(&self) {
        let instance = self.instance;
        info!("");
        info!("QIP INPUT:");
        info!("{}", LOG_SEP);
        info!("TRACK-SESSION-CAPACITY:{}", self.params.track_session_capacity);
        info!("PAPER-DISTRIBUTION-METHOD:{}", self.params.paper_distribution);
        info!("SESSIONS:{} | {:?}", instance.session_ids.len(), ids(&instance.session_ids));
        info!("TRACKS:{} | {:?}", instance.track_ids.len(), ids(&instance.track_ids));
        info!("BIDS (=len(U)):{}", instance.preferences.len());
        info!("PAPER-SESSION CONFLICTS (=len(T)):{}", instance.conflicts.len());
        info!("PAPERS:{}", instance.paper_ids.len());
        debug!("{:?}", ids(&instance.paper_ids));
        info!("BIDDERS:{}", instance.bidder_ids.len());
        debug!("{:?}", ids(&instance.bidder_ids));
        info!("AUTHORS:{}", instance.author_ids.len());
        debug!("{:?}", ids(&instance.author_ids));
    }

    // ==========================================
    // 变量
    // ==========================================

    fn define_variables(&self, model: &mut QipModel) {
        let slots = model.slots().to_vec();

        for p in &self.instance.paper_ids {
            for &slot in &slots {
                model.add_variable(VarFamily::Paper, p.0, slot);
            }
        }
        for b in &self.instance.bidder_ids {
            for &slot in &slots {
                model.add_variable(VarFamily::Bidder, b.0, slot);
            }
        }
        // 仅受约束作者 (>= 2 篇论文) 需要出席变量
        let constrained = self.instance.constrained_authors();
        for a in self.instance.author_ids.iter().filter(|a| constrained.contains(a)) {
            for &slot in &slots {
                model.add_variable(VarFamily::Author, a.0, slot);
            }
        }
        for t in &self.instance.topic_ids {
            for &slot in &slots {
                model.add_variable(VarFamily::Topic, t.0, slot);
            }
        }

        debug!(
            variables = model.num_variables(),
            constrained_authors = constrained.len(),
            "决策变量定义完成"
        );
    }

    // ==========================================
    // 论文约束 (x)
    // ==========================================

    fn add_paper_constraints(&self, model: &mut QipModel) -> EngineResult<()> {
        let slots = model.slots().to_vec();
        let capacity = self.params.track_session_capacity;

        // 每篇论文恰好出现在一个 (session, track)
        for &p in &self.instance.paper_ids {
            let terms = slots
                .iter()
                .map(|&slot| (x_var(model, p.0, slot), 1.0))
                .collect();
            model.add_constraint(LinearConstraint::new(
                format!("PAPER{}_ALLOC_EXACTLY_ONCE", p),
                ConstraintFamily::Allocation,
                terms,
                ConstraintSense::Eq,
                1.0,
            ));
        }

        // 每个 slot 的论文数
        for &slot in &slots {
            let terms = self
                .instance
                .paper_ids
                .iter()
                .map(|p| (x_var(model, p.0, slot), 1.0))
                .collect();
            let (sense, label) = match self.params.paper_distribution {
                PaperDistribution::UpperBound => (ConstraintSense::Le, "<="),
                PaperDistribution::Exact => (ConstraintSense::Eq, "=="),
            };
            model.add_constraint(LinearConstraint::new(
                format!(
                    "SESSION{}_TRACK{}_HAS_{}_{}_PAPERS",
                    slot.session, slot.track, label, capacity
                ),
                ConstraintFamily::Capacity,
                terms,
                sense,
                capacity as f64,
            ));
        }

        // 时间冲突: 论文 p 不能安排在 session j
        for &(session, paper) in &self.instance.conflicts {
            for &track in &self.instance.track_ids {
                let slot = Slot::new(session, track);
                model.add_constraint(LinearConstraint::new(
                    format!(
                        "PAPER{}_CANNOT_BE_IN_SESSION{}_TRACK{}",
                        paper, session, track
                    ),
                    ConstraintFamily::Conflict,
                    vec![(x_var(model, paper.0, slot), 1.0)],
                    ConstraintSense::Eq,
                    0.0,
                ));
            }
        }

        // 实例专用约束
        let mut ctx = HookContext::new(model, &self.instance.session_ids);
        self.hook.add_constraints(&mut ctx)?;

        Ok(())
    }

    // ==========================================
    // 投标者约束 (y)
    // ==========================================

    fn add_bidder_constraints(&self, model: &mut QipModel) {
        for &b in &self.instance.bidder_ids {
            for &j in &self.instance.session_ids {
                let terms = self
                    .instance
                    .track_ids
                    .iter()
                    .map(|&k| (model.handles().y[&(b, Slot::new(j, k))], 1.0))
                    .collect();
                model.add_constraint(LinearConstraint::new(
                    format!("BIDDER{}_SESSION{}_CAN_ONLY_BE_IN_SINGLE_TRACK", b, j),
                    ConstraintFamily::BidderExclusivity,
                    terms,
                    ConstraintSense::Le,
                    1.0,
                ));
            }
        }
    }

    // ==========================================
    // 作者约束 (z)
    // ==========================================

    fn add_author_constraints(&self, model: &mut QipModel) {
        let slots = model.slots().to_vec();

        // 作者必须出席其论文所在的 (session, track)
        for (a, p) in self.instance.constrained_authorship() {
            for &slot in &slots {
                let z = model.handles().z[&(a, slot)];
                let x = x_var(model, p.0, slot);
                model.add_constraint(LinearConstraint::new(
                    format!(
                        "AUTHOR{}_PAPER{}_SESSION{}_TRACK{}_PRESENCE",
                        a, p, slot.session, slot.track
                    ),
                    ConstraintFamily::AuthorLinkage,
                    vec![(z, 1.0), (x, -1.0)],
                    ConstraintSense::Ge,
                    0.0,
                ));
            }
        }

        // 作者每个 session 至多出席一个 track
        let constrained = self.instance.constrained_authors();
        for a in self.instance.author_ids.iter().filter(|a| constrained.contains(a)) {
            for &j in &self.instance.session_ids {
                let terms = self
                    .instance
                    .track_ids
                    .iter()
                    .map(|&k| (model.handles().z[&(*a, Slot::new(j, k))], 1.0))
                    .collect();
                model.add_constraint(LinearConstraint::new(
                    format!("AUTHOR{}_SESSION{}_CAN_ONLY_BE_IN_SINGLE_TRACK", a, j),
                    ConstraintFamily::AuthorExclusivity,
                    terms,
                    ConstraintSense::Le,
                    1.0,
                ));
            }
        }
    }

    // ==========================================
    // 主题约束 (q)
    // ==========================================

    fn add_topic_constraints(&self, model: &mut QipModel) {
        for &t in &self.instance.topic_ids {
            for &j in &self.instance.session_ids {
                let terms = self
                    .instance
                    .track_ids
                    .iter()
                    .map(|&k| (model.handles().q[&(t, Slot::new(j, k))], 1.0))
                    .collect();
                model.add_constraint(LinearConstraint::new(
                    format!("TOPIC{}_SESSION{}_CAN_ONLY_BE_IN_SINGLE_TRACK", t, j),
                    ConstraintFamily::TopicExclusivity,
                    terms,
                    ConstraintSense::Le,
                    1.0,
                ));
            }
        }
    }

    // ==========================================
    // 目标函数
    // ==========================================
    // max  Σ U(b,p)·x[p,s]·y[b,s]          投标者效用
    //    - bidder_cost · Σ y[b,s]           出席成本
    //    + topic_utility · Σ x[p,s]·q[t,s]  主题聚合收益
    //    - topic_cost · Σ q[t,s]            主题激活成本
    // 系数为 0 的项不写入
    fn add_objective(&self, model: &mut QipModel) {
        let slots = model.slots().to_vec();
        let handles = model.handles();
        let mut objective = QuadraticObjective::default();

        for (&(b, p), &utility) in &self.instance.preferences {
            if utility <= 0.0 {
                continue;
            }
            for &slot in &slots {
                objective.quadratic.push(QuadraticTerm {
                    left: handles.x[&(p, slot)],
                    right: handles.y[&(b, slot)],
                    coefficient: utility,
                });
            }
        }

        if self.params.bidder_cost != 0.0 {
            for &b in &self.instance.bidder_ids {
                for &slot in &slots {
                    objective
                        .linear
                        .push((handles.y[&(b, slot)], -self.params.bidder_cost));
                }
            }
        }

        if self.params.topic_utility != 0.0 {
            for &(p, t) in &self.instance.paper_topics {
                for &slot in &slots {
                    objective.quadratic.push(QuadraticTerm {
                        left: handles.x[&(p, slot)],
                        right: handles.q[&(t, slot)],
                        coefficient: self.params.topic_utility,
                    });
                }
            }
        }

        if self.params.topic_cost != 0.0 {
            for &t in &self.instance.topic_ids {
                for &slot in &slots {
                    objective
                        .linear
                        .push((handles.q[&(t, slot)], -self.params.topic_cost));
                }
            }
        }

        model.set_objective(objective, ObjectiveSense::Maximize);
    }
}

fn x_var(model: &QipModel, paper: u32, slot: Slot) -> VarId {
    model.handles().x[&(paper.into(), slot)]
}

fn ids<T: Copy + std::fmt::Display>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.to_string()).collect()
}

/// 输出构建统计
pub fn log_build_details(model: &QipModel) {
    let stats = model.statistics();
    info!("");
    info!("BUILD DETAILS:");
    info!("Problem:{}", model.problem_type());
    info!("BinaryVariables:{}", stats.binary_variables);
    for (family, count) in &stats.variables_by_family {
        info!("  {}:{}", family, count);
    }
    info!("Constraints:{}", stats.constraints);
    for (family, count) in &stats.constraints_by_family {
        info!("  {}:{}", family, count);
    }
    info!("LinearObjectiveTerms:{}", stats.linear_objective_terms);
    info!("QuadraticObjectiveTerms:{}", stats.quadratic_objective_terms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AuthorId, BidderId, PaperId, SessionId, TopicId, TrackId};
    use crate::engine::error::EngineError;

    fn grid_instance() -> InstanceData {
        let mut instance = InstanceData {
            session_ids: vec![SessionId(1), SessionId(2)],
            track_ids: vec![TrackId(1), TrackId(2)],
            paper_ids: (1..=4).map(PaperId).collect(),
            bidder_ids: vec![BidderId(1)],
            author_ids: vec![AuthorId(1), AuthorId(2)],
            topic_ids: vec![TopicId(1)],
            ..Default::default()
        };
        for p in 1..=4 {
            instance.preferences.insert((BidderId(1), PaperId(p)), 10.0);
        }
        instance.authorship.insert((AuthorId(1), PaperId(1)));
        instance.authorship.insert((AuthorId(1), PaperId(2)));
        instance.authorship.insert((AuthorId(2), PaperId(3)));
        instance.conflicts.insert((SessionId(1), PaperId(4)));
        instance.paper_topics.insert((PaperId(1), TopicId(1)));
        instance
    }

    fn params() -> ModelParameters {
        ModelParameters {
            track_session_capacity: 2,
            paper_distribution: PaperDistribution::Exact,
            bidder_cost: 1.0,
            topic_cost: 2.0,
            topic_utility: 3.0,
        }
    }

    #[test]
    fn test_build_counts_per_family() {
        let instance = grid_instance();
        let mut builder = ModelBuilder::new(&instance, params());
        let model = builder.build().unwrap();
        let stats = model.statistics();

        // x: 4 papers × 4 slots, y: 1 × 4, z: 仅作者1 × 4, q: 1 × 4
        assert_eq!(stats.binary_variables, 16 + 4 + 4 + 4);
        assert_eq!(stats.variables_by_family["z"], 4);

        let by_family = &stats.constraints_by_family;
        assert_eq!(by_family[&ConstraintFamily::Allocation], 4);
        assert_eq!(by_family[&ConstraintFamily::Capacity], 4);
        assert_eq!(by_family[&ConstraintFamily::Conflict], 2);
        assert_eq!(by_family[&ConstraintFamily::BidderExclusivity], 2);
        assert_eq!(by_family[&ConstraintFamily::AuthorLinkage], 8);
        assert_eq!(by_family[&ConstraintFamily::AuthorExclusivity], 2);
        assert_eq!(by_family[&ConstraintFamily::TopicExclusivity], 2);

        // U: 4 bids × 4 slots, Q: 1 × 4
        assert_eq!(stats.quadratic_objective_terms, 16 + 4);
        // bidder cost 4 + topic cost 4
        assert_eq!(stats.linear_objective_terms, 8);
        assert_eq!(model.problem_type(), "MIQP");
    }

    #[test]
    fn test_build_twice_is_usage_error() {
        let instance = grid_instance();
        let mut builder = ModelBuilder::new(&instance, params());
        builder.build().unwrap();
        let err = builder.build().unwrap_err();
        assert_eq!(err, EngineError::Usage(UsageError::AlreadyBuilt));
        assert!(builder.is_built());
    }

    #[test]
    fn test_upper_bound_uses_le_capacity() {
        let instance = grid_instance();
        let mut p = params();
        p.paper_distribution = PaperDistribution::UpperBound;
        let mut builder = ModelBuilder::new(&instance, p);
        let model = builder.build().unwrap();
        let capacity: Vec<_> = model
            .constraints()
            .iter()
            .filter(|c| c.family == ConstraintFamily::Capacity)
            .collect();
        assert!(capacity.iter().all(|c| c.sense == ConstraintSense::Le && c.rhs == 2.0));
        assert_eq!(capacity[0].name, "SESSION1_TRACK1_HAS_<=_2_PAPERS");
    }

    #[test]
    fn test_zero_utility_bid_skipped_in_objective() {
        let mut instance = grid_instance();
        instance.preferences.insert((BidderId(1), PaperId(4)), 0.0);
        let mut builder = ModelBuilder::new(&instance, params());
        let model = builder.build().unwrap();
        // 3 个正效用投标 × 4 slots + 主题 4
        assert_eq!(model.objective().quadratic.len(), 12 + 4);
    }

    #[test]
    fn test_invalid_instance_rejected_before_build() {
        let mut instance = grid_instance();
        instance.paper_topics.insert((PaperId(1), TopicId(99)));
        let mut builder = ModelBuilder::new(&instance, params());
        assert!(matches!(builder.build(), Err(EngineError::Instance(_))));
        assert!(!builder.is_built());
    }
}
