// ==========================================
// 会议论文排程系统 - 运行配置
// ==========================================
// 职责: 驱动程序一次运行所需的全部配置 (JSON 文件)
// 覆写: 环境变量优先于文件
// - CONFERENCE_SCHEDULER_TIME_LIMIT=60      时间限制 (秒)
// - CONFERENCE_SCHEDULER_RESULTS_DIR=path   结果目录前缀
// ==========================================

use crate::config::model_params::ModelParameters;
use crate::config::solver_config::SolverConfig;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_TIME_LIMIT: &str = "CONFERENCE_SCHEDULER_TIME_LIMIT";
pub const ENV_RESULTS_DIR: &str = "CONFERENCE_SCHEDULER_RESULTS_DIR";

/// 运行日志文件格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 结果输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 是否落盘保存结果
    #[serde(default)]
    pub save_results: bool,

    /// 结果目录前缀,实际目录为 `<results_dir>_<时间戳>`
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// 排程表文件名 (不含时间戳与扩展名)
    #[serde(default = "default_schedule_filename")]
    pub schedule_filename: String,

    /// 运行日志文件格式
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("QIP_RESULTS")
}

fn default_schedule_filename() -> String {
    "schedule".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_results: false,
            results_dir: default_results_dir(),
            schedule_filename: default_schedule_filename(),
            log_format: LogFormat::default(),
        }
    }
}

/// 运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub instance_path: PathBuf,
    pub catalog_path: PathBuf,
    #[serde(default)]
    pub model: ModelParameters,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    /// 从 JSON 文件加载,并应用环境变量覆写
    ///
    /// 相对路径 (instance_path / catalog_path) 以配置文件所在目录为基准
    pub fn load(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let mut config: RunConfig =
            serde_json::from_str(&raw).map_err(|e| ImportError::JsonParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if let Some(base) = path.parent() {
            config.instance_path = resolve(base, &config.instance_path);
            config.catalog_path = resolve(base, &config.catalog_path);
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.model.validate().map_err(|e| ImportError::ConfigValueError {
            key: "model".to_string(),
            value: format!("{:?}", config.model),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// 应用环境变量覆写
    ///
    /// `lookup` 便于测试注入,生产环境传 `std::env::var`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ImportResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TIME_LIMIT) {
            let seconds = value
                .trim()
                .parse::<f64>()
                .map_err(|e| ImportError::ConfigValueError {
                    key: ENV_TIME_LIMIT.to_string(),
                    value: value.clone(),
                    message: e.to_string(),
                })?;
            self.solver.time_limit_seconds = Some(seconds);
        }

        if let Some(value) = lookup(ENV_RESULTS_DIR) {
            if !value.trim().is_empty() {
                self.output.results_dir = PathBuf::from(value.trim());
            }
        }

        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PaperDistribution;

    fn minimal() -> RunConfig {
        serde_json::from_str(
            r#"{"instance_path": "instance.json", "catalog_path": "catalog.json"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_follow_reference_run() {
        let config = minimal();
        assert_eq!(config.model.track_session_capacity, 4);
        assert_eq!(config.model.paper_distribution, PaperDistribution::Exact);
        assert!(!config.output.save_results);
        assert_eq!(config.output.results_dir, PathBuf::from("QIP_RESULTS"));
        assert_eq!(config.output.log_format, LogFormat::Text);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = minimal();
        config
            .apply_env_overrides(|key| match key {
                ENV_TIME_LIMIT => Some("12.5".to_string()),
                ENV_RESULTS_DIR => Some("/tmp/qip".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.solver.time_limit_seconds, Some(12.5));
        assert_eq!(config.output.results_dir, PathBuf::from("/tmp/qip"));
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = minimal();
        let err = config
            .apply_env_overrides(|key| (key == ENV_TIME_LIMIT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ImportError::ConfigValueError { .. }));
    }
}
