// ==========================================
// 会议论文排程系统 - 双线性项线性化
// ==========================================
// 职责: 将 QipModel 的二次目标改写为纯线性 MILP
// 方法: 对每个乘积 w = a·b (a,b ∈ {0,1}) 引入辅助二元变量 w
//   w <= a
//   w <= b
//   w >= a + b - 1
// 红线: 对二元变量精确等价,不改变最优值
// ==========================================

use crate::engine::model::{
    ConstraintFamily, ConstraintSense, LinearConstraint, ObjectiveSense, QipModel, VarId,
};
use std::collections::BTreeMap;

/// 辅助乘积变量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductVar {
    pub id: VarId,
    pub left: VarId,
    pub right: VarId,
}

// ==========================================
// LinearizedModel - 线性化后的模型
// ==========================================
// 变量编号: 前段与原模型一致, 之后为乘积变量
#[derive(Debug, Clone, PartialEq)]
pub struct LinearizedModel {
    pub variable_names: Vec<String>,
    pub products: Vec<ProductVar>,
    pub constraints: Vec<LinearConstraint>,
    pub objective: Vec<(VarId, f64)>,
    pub constant: f64,
    pub sense: ObjectiveSense,
}

impl LinearizedModel {
    pub fn num_variables(&self) -> usize {
        self.variable_names.len()
    }

    pub fn num_linearization_constraints(&self) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.family == ConstraintFamily::Linearization)
            .count()
    }

    /// 按给定取值计算线性目标
    pub fn evaluate<F: Fn(VarId) -> f64>(&self, value: F) -> f64 {
        self.constant
            + self
                .objective
                .iter()
                .map(|&(v, c)| c * value(v))
                .sum::<f64>()
    }
}

/// 线性化
///
/// 同一无序变量对只生成一个乘积变量,系数合并;
/// a·a 直接化为 a (二元变量幂等)
pub fn linearize(model: &QipModel) -> LinearizedModel {
    let mut variable_names: Vec<String> =
        model.variables().iter().map(|v| v.name.clone()).collect();
    let mut constraints = model.constraints().to_vec();
    let mut coefficients: BTreeMap<VarId, f64> = BTreeMap::new();
    let mut products: Vec<ProductVar> = Vec::new();
    let mut product_index: BTreeMap<(VarId, VarId), VarId> = BTreeMap::new();

    for &(var, coef) in &model.objective().linear {
        *coefficients.entry(var).or_insert(0.0) += coef;
    }

    for term in &model.objective().quadratic {
        if term.left == term.right {
            *coefficients.entry(term.left).or_insert(0.0) += term.coefficient;
            continue;
        }
        let key = if term.left < term.right {
            (term.left, term.right)
        } else {
            (term.right, term.left)
        };

        let w = match product_index.get(&key) {
            Some(&w) => w,
            None => {
                let w = VarId(variable_names.len());
                let name = format!(
                    "w_{}_{}",
                    variable_names[key.0.index()],
                    variable_names[key.1.index()]
                );
                push_mccormick(&mut constraints, &name, w, key.0, key.1);
                variable_names.push(name);
                products.push(ProductVar {
                    id: w,
                    left: key.0,
                    right: key.1,
                });
                product_index.insert(key, w);
                w
            }
        };
        *coefficients.entry(w).or_insert(0.0) += term.coefficient;
    }

    LinearizedModel {
        variable_names,
        products,
        constraints,
        objective: coefficients.into_iter().filter(|&(_, c)| c != 0.0).collect(),
        constant: model.objective().constant,
        sense: model.sense(),
    }
}

fn push_mccormick(
    constraints: &mut Vec<LinearConstraint>,
    name: &str,
    w: VarId,
    a: VarId,
    b: VarId,
) {
    constraints.push(LinearConstraint::new(
        format!("{}_LE_LEFT", name),
        ConstraintFamily::Linearization,
        vec![(w, 1.0), (a, -1.0)],
        ConstraintSense::Le,
        0.0,
    ));
    constraints.push(LinearConstraint::new(
        format!("{}_LE_RIGHT", name),
        ConstraintFamily::Linearization,
        vec![(w, 1.0), (b, -1.0)],
        ConstraintSense::Le,
        0.0,
    ));
    constraints.push(LinearConstraint::new(
        format!("{}_GE_BOTH", name),
        ConstraintFamily::Linearization,
        vec![(w, 1.0), (a, -1.0), (b, -1.0)],
        ConstraintSense::Ge,
        -1.0,
    ));
}
