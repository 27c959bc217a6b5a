// ==========================================
// 会议论文排程系统 - QIP 模型中间表示
// ==========================================
// 职责: 与求解器无关的模型结构
// - 二元决策变量 (按 family + 实体 + slot 键控)
// - 带名称与族标签的线性约束
// - 二次 (双线性) 目标函数, 方向 = 最大化
// 红线: 构建完成后不可修改 (变更方法仅 crate 内可见)
// ==========================================

use crate::domain::types::{AuthorId, BidderId, PaperId, Slot, TopicId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// 变量
// ==========================================

/// 变量句柄 (模型内的位置索引)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 变量族
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VarFamily {
    Paper,  // x[p,slot] 论文分配
    Bidder, // y[b,slot] 投标者出席
    Author, // z[a,slot] 作者出席
    Topic,  // q[t,slot] 主题激活
}

impl VarFamily {
    pub fn symbol(self) -> &'static str {
        match self {
            VarFamily::Paper => "x",
            VarFamily::Bidder => "y",
            VarFamily::Author => "z",
            VarFamily::Topic => "q",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDef {
    pub family: VarFamily,
    pub entity: u32,
    pub slot: Slot,
    pub name: String, // 例: x_3_1_2 = 论文3, session1, track2
}

/// 各族变量句柄表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableHandles {
    pub x: BTreeMap<(PaperId, Slot), VarId>,
    pub y: BTreeMap<(BidderId, Slot), VarId>,
    pub z: BTreeMap<(AuthorId, Slot), VarId>,
    pub q: BTreeMap<(TopicId, Slot), VarId>,
}

// ==========================================
// 约束
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintSense {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for ConstraintSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSense::Eq => write!(f, "=="),
            ConstraintSense::Le => write!(f, "<="),
            ConstraintSense::Ge => write!(f, ">="),
        }
    }
}

/// 约束族 (用于诊断与统计)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintFamily {
    Allocation,
    Capacity,
    Conflict,
    BidderExclusivity,
    AuthorLinkage,
    AuthorExclusivity,
    TopicExclusivity,
    PaperSpecific,
    Linearization,
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConstraintFamily::Allocation => "ALLOCATION",
            ConstraintFamily::Capacity => "CAPACITY",
            ConstraintFamily::Conflict => "CONFLICT",
            ConstraintFamily::BidderExclusivity => "BIDDER_EXCLUSIVITY",
            ConstraintFamily::AuthorLinkage => "AUTHOR_LINKAGE",
            ConstraintFamily::AuthorExclusivity => "AUTHOR_EXCLUSIVITY",
            ConstraintFamily::TopicExclusivity => "TOPIC_EXCLUSIVITY",
            ConstraintFamily::PaperSpecific => "PAPER_SPECIFIC",
            ConstraintFamily::Linearization => "LINEARIZATION",
        };
        write!(f, "{}", label)
    }
}

/// 线性约束: Σ coef·var (sense) rhs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub terms: Vec<(VarId, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(
        name: impl Into<String>,
        family: ConstraintFamily,
        terms: Vec<(VarId, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            terms,
            sense,
            rhs,
        }
    }

    /// 左端取值
    pub fn lhs<F: Fn(VarId) -> f64>(&self, value: F) -> f64 {
        self.terms.iter().map(|&(var, coef)| coef * value(var)).sum()
    }

    /// 给定左端值,在容差内是否满足
    pub fn is_satisfied_by(&self, lhs: f64, tolerance: f64) -> bool {
        match self.sense {
            ConstraintSense::Eq => (lhs - self.rhs).abs() <= tolerance,
            ConstraintSense::Le => lhs <= self.rhs + tolerance,
            ConstraintSense::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

// ==========================================
// 目标函数
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

/// 双线性项: coefficient · left · right
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadraticTerm {
    pub left: VarId,
    pub right: VarId,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuadraticObjective {
    pub linear: Vec<(VarId, f64)>,
    pub quadratic: Vec<QuadraticTerm>,
    pub constant: f64,
}

impl QuadraticObjective {
    /// 按给定变量取值计算目标值
    pub fn evaluate<F: Fn(VarId) -> f64>(&self, value: F) -> f64 {
        let linear: f64 = self.linear.iter().map(|&(v, c)| c * value(v)).sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .map(|t| t.coefficient * value(t.left) * value(t.right))
            .sum();
        self.constant + linear + quadratic
    }
}

// ==========================================
// 赋值 (求解器返回的 0/1 取值)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, var: VarId) -> bool {
        self.values.get(var.0).copied().unwrap_or(false)
    }

    pub fn value(&self, var: VarId) -> f64 {
        if self.get(var) {
            1.0
        } else {
            0.0
        }
    }

    /// 取值为 1 的变量
    pub fn ones(&self) -> impl Iterator<Item = VarId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(idx, _)| VarId(idx))
    }
}

// ==========================================
// 构建统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildStatistics {
    pub binary_variables: usize,
    pub variables_by_family: BTreeMap<String, usize>,
    pub constraints: usize,
    pub constraints_by_family: BTreeMap<ConstraintFamily, usize>,
    pub linear_objective_terms: usize,
    pub quadratic_objective_terms: usize,
}

// ==========================================
// QipModel - 构建完成的模型
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct QipModel {
    pub(crate) name: String,
    pub(crate) slots: Vec<Slot>,
    pub(crate) variables: Vec<VariableDef>,
    pub(crate) handles: VariableHandles,
    pub(crate) constraints: Vec<LinearConstraint>,
    pub(crate) objective: QuadraticObjective,
    pub(crate) sense: ObjectiveSense,
}

impl QipModel {
    pub(crate) fn new(name: impl Into<String>, slots: Vec<Slot>) -> Self {
        Self {
            name: name.into(),
            slots,
            variables: Vec::new(),
            handles: VariableHandles::default(),
            constraints: Vec::new(),
            objective: QuadraticObjective::default(),
            sense: ObjectiveSense::Maximize,
        }
    }

    /// 新增二元变量并登记到对应族的句柄表
    pub(crate) fn add_variable(&mut self, family: VarFamily, entity: u32, slot: Slot) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDef {
            family,
            entity,
            slot,
            name: format!(
                "{}_{}_{}_{}",
                family.symbol(),
                entity,
                slot.session,
                slot.track
            ),
        });
        match family {
            VarFamily::Paper => self.handles.x.insert((PaperId(entity), slot), id),
            VarFamily::Bidder => self.handles.y.insert((BidderId(entity), slot), id),
            VarFamily::Author => self.handles.z.insert((AuthorId(entity), slot), id),
            VarFamily::Topic => self.handles.q.insert((TopicId(entity), slot), id),
        };
        id
    }

    pub(crate) fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    pub(crate) fn set_objective(&mut self, objective: QuadraticObjective, sense: ObjectiveSense) {
        self.objective = objective;
        self.sense = sense;
    }

    // ===== 只读访问 =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &VariableDef {
        &self.variables[id.0]
    }

    pub fn handles(&self) -> &VariableHandles {
        &self.handles
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &QuadraticObjective {
        &self.objective
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// 问题类型 (含双线性目标项即为 MIQP)
    pub fn problem_type(&self) -> &'static str {
        if self.objective.quadratic.is_empty() {
            "MILP"
        } else {
            "MIQP"
        }
    }

    pub fn statistics(&self) -> BuildStatistics {
        let mut variables_by_family = BTreeMap::new();
        for var in &self.variables {
            *variables_by_family
                .entry(var.family.symbol().to_string())
                .or_insert(0) += 1;
        }
        let mut constraints_by_family = BTreeMap::new();
        for c in &self.constraints {
            *constraints_by_family.entry(c.family).or_insert(0) += 1;
        }

        BuildStatistics {
            binary_variables: self.variables.len(),
            variables_by_family,
            constraints: self.constraints.len(),
            constraints_by_family,
            linear_objective_terms: self.objective.linear.len(),
            quadratic_objective_terms: self.objective.quadratic.len(),
        }
    }

    /// 约束清单 (每行一条,带序号)
    pub fn constraints_listing(&self) -> String {
        let mut out = String::from("CONSTRAINTS\n");
        out.push_str(&"#".repeat(74));
        out.push('\n');
        for (idx, c) in self.constraints.iter().enumerate() {
            out.push_str(&format!(
                "({}):   {}: {} {} {}\n",
                idx,
                c.name,
                self.format_terms(&c.terms),
                c.sense,
                c.rhs
            ));
        }
        out
    }

    /// 目标函数表达式
    pub fn objective_listing(&self) -> String {
        let mut out = String::from("OBJECTIVE\n");
        out.push_str(&"#".repeat(74));
        out.push('\n');
        out.push_str(match self.sense {
            ObjectiveSense::Maximize => "maximize ",
            ObjectiveSense::Minimize => "minimize ",
        });

        let mut parts: Vec<String> = self
            .objective
            .quadratic
            .iter()
            .map(|t| {
                format!(
                    "{}{}*{}",
                    t.coefficient,
                    self.variables[t.left.0].name,
                    self.variables[t.right.0].name
                )
            })
            .collect();
        parts.extend(
            self.objective
                .linear
                .iter()
                .map(|&(v, c)| format!("{}{}", c, self.variables[v.0].name)),
        );
        if self.objective.constant != 0.0 {
            parts.push(self.objective.constant.to_string());
        }
        out.push_str(&parts.join(" + "));
        out.push('\n');
        out
    }

    fn format_terms(&self, terms: &[(VarId, f64)]) -> String {
        terms
            .iter()
            .map(|&(v, c)| {
                if c == 1.0 {
                    self.variables[v.0].name.clone()
                } else {
                    format!("{}{}", c, self.variables[v.0].name)
                }
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }
}
