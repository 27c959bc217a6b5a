// ==========================================
// 会议论文排程系统 - 模型参数
// ==========================================
// 职责: capacity / 分配模式 / 目标函数系数
// ==========================================

use crate::domain::types::PaperDistribution;
use crate::engine::error::UsageError;
use serde::{Deserialize, Serialize};

/// 模型参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// 每个 slot 的论文容量
    pub track_session_capacity: usize,

    /// 容量约束模式 ("exact" / "upper_bound")
    pub paper_distribution: PaperDistribution,

    /// 投标者出席一个 slot 的成本
    pub bidder_cost: f64,

    /// 主题在一个 slot 激活的成本
    pub topic_cost: f64,

    /// 同 slot 论文与主题共现的收益
    pub topic_utility: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            track_session_capacity: 4,
            paper_distribution: PaperDistribution::Exact,
            bidder_cost: 5.0,
            topic_cost: 25.0,
            topic_utility: 100.0,
        }
    }
}

impl ModelParameters {
    /// 校验参数
    ///
    /// # 规则
    /// - capacity > 0
    /// - 三个系数均为有限值
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.track_session_capacity == 0 {
            return Err(UsageError::InvalidParameter {
                name: "track_session_capacity",
                value: "0".to_string(),
            });
        }

        let coefficients = [
            ("bidder_cost", self.bidder_cost),
            ("topic_cost", self.topic_cost),
            ("topic_utility", self.topic_utility),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() {
                return Err(UsageError::InvalidParameter {
                    name,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(ModelParameters::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let params = ModelParameters {
            track_session_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(UsageError::InvalidParameter {
                name: "track_session_capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_distribution_in_json() {
        let json = r#"{
            "track_session_capacity": 2,
            "paper_distribution": "round_robin",
            "bidder_cost": 1.0,
            "topic_cost": 0.0,
            "topic_utility": 0.0
        }"#;
        let err = serde_json::from_str::<ModelParameters>(json).unwrap_err();
        assert!(err.to_string().contains("round_robin"));
    }
}
