// ==========================================
// 会议论文排程系统 - 求解器配置
// ==========================================
// 职责: 时间限制与数值容差 (均可不设置)
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 默认整数容差
pub const DEFAULT_INTEGRALITY_TOLERANCE: f64 = 1e-5;

/// 默认可行性容差
pub const DEFAULT_FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// 求解器配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// 时间限制 (秒)
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,

    /// MIP 相对间隙
    #[serde(default)]
    pub mip_relative_gap: Option<f64>,

    /// 整数容差
    #[serde(default)]
    pub integrality_tolerance: Option<f64>,

    /// 可行性容差
    #[serde(default)]
    pub feasibility_tolerance: Option<f64>,

    /// 输出求解器日志
    #[serde(default)]
    pub verbose_solver_log: bool,
}

impl SolverConfig {
    /// 时间限制;非正数、非有限值或超出 Duration 范围的值视为未设置
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    pub fn integrality_tolerance(&self) -> f64 {
        self.integrality_tolerance
            .unwrap_or(DEFAULT_INTEGRALITY_TOLERANCE)
    }

    pub fn feasibility_tolerance(&self) -> f64 {
        self.feasibility_tolerance
            .unwrap_or(DEFAULT_FEASIBILITY_TOLERANCE)
    }
}
