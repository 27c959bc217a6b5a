// ==========================================
// 会议论文排程系统 - 运行结果落盘
// ==========================================
// 目录: <results_dir>_<时间戳>, 时间戳格式 %d_%m_%Y_%H-%M-%S
// 文件:
// - qip_logs_<stamp>.log            运行日志 (由 RunLog 写入)
// - qip_solution_<stamp>.json       原始解记录
// - qip_solve_details_<stamp>.json  求解明细
// - qip_schedule_<stamp>.json       排程结构
// - <schedule_filename>_<stamp>.csv 排程表
// - qip_constraints_<stamp>.txt     约束清单
// - qip_objective_<stamp>.txt       目标函数
// - run_manifest.json               运行清单
// ==========================================

use crate::config::{ModelParameters, SolverConfig};
use crate::domain::schedule::Schedule;
use crate::engine::model::QipModel;
use crate::engine::solver::{SolutionRecord, SolveDetails};
use crate::report::csv_renderer::CsvScheduleRenderer;
use crate::report::error::{ReportError, ReportResult};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const STAMP_FORMAT: &str = "%d_%m_%Y_%H-%M-%S";
pub const MANIFEST_FILE: &str = "run_manifest.json";

/// 运行清单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub stamp: String,
    pub started_at: DateTime<Local>,
    pub instance_path: PathBuf,
    pub catalog_path: PathBuf,
    pub model: ModelParameters,
    pub solver: SolverConfig,
    pub status: String,
    pub objective_value: Option<f64>,
    pub files: Vec<String>,
}

// ==========================================
// ResultsFolder - 单次运行的结果目录
// ==========================================
#[derive(Debug, Clone)]
pub struct ResultsFolder {
    root: PathBuf,
    stamp: String,
    run_id: Uuid,
    started_at: DateTime<Local>,
}

impl ResultsFolder {
    /// 以当前时间创建结果目录
    pub fn create(prefix: &Path) -> ReportResult<Self> {
        Self::create_at(prefix, Local::now())
    }

    pub fn create_at(prefix: &Path, started_at: DateTime<Local>) -> ReportResult<Self> {
        let stamp = started_at.format(STAMP_FORMAT).to_string();
        let mut name = prefix.as_os_str().to_owned();
        name.push("_");
        name.push(&stamp);
        let root = PathBuf::from(name);

        std::fs::create_dir_all(&root).map_err(|e| ReportError::io(&root, e))?;

        let folder = Self {
            root,
            stamp,
            run_id: Uuid::new_v4(),
            started_at,
        };
        info!(path = %folder.root.display(), run_id = %folder.run_id, "结果目录已创建");
        Ok(folder)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 目录内带时间戳的文件路径: <stem>_<stamp>.<ext>
    pub fn file(&self, stem: &str, ext: &str) -> PathBuf {
        self.root.join(format!("{}_{}.{}", stem, self.stamp, ext))
    }

    pub fn log_path(&self) -> PathBuf {
        self.file("qip_logs", "log")
    }

    pub fn write_solution(&self, record: &SolutionRecord) -> ReportResult<PathBuf> {
        self.write_json("qip_solution", record)
    }

    pub fn write_solve_details(&self, details: &SolveDetails) -> ReportResult<PathBuf> {
        self.write_json("qip_solve_details", details)
    }

    pub fn write_schedule(&self, schedule: &Schedule) -> ReportResult<PathBuf> {
        self.write_json("qip_schedule", schedule)
    }

    pub fn write_schedule_csv(&self, schedule: &Schedule, filename: &str) -> ReportResult<PathBuf> {
        let path = self.file(filename, "csv");
        CsvScheduleRenderer::new().write_to(schedule, &path)?;
        Ok(path)
    }

    /// 约束清单与目标函数
    pub fn write_model_listings(&self, model: &QipModel) -> ReportResult<(PathBuf, PathBuf)> {
        let constraints = self.file("qip_constraints", "txt");
        write_text(&constraints, &model.constraints_listing())?;
        let objective = self.file("qip_objective", "txt");
        write_text(&objective, &model.objective_listing())?;
        Ok((constraints, objective))
    }

    /// 写出运行清单;files 为目录内已存在的文件名 (排序)
    pub fn write_manifest(&self, manifest: &mut RunManifest) -> ReportResult<PathBuf> {
        let mut files: Vec<String> = std::fs::read_dir(&self.root)
            .map_err(|e| ReportError::io(&self.root, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name != MANIFEST_FILE)
            .collect();
        files.sort();
        manifest.files = files;

        let path = self.root.join(MANIFEST_FILE);
        write_text(&path, &serde_json::to_string_pretty(manifest)?)?;
        Ok(path)
    }

    /// 以本目录的 run_id / stamp 生成清单骨架
    pub fn manifest(
        &self,
        instance_path: &Path,
        catalog_path: &Path,
        model: &ModelParameters,
        solver: &SolverConfig,
    ) -> RunManifest {
        RunManifest {
            run_id: self.run_id,
            stamp: self.stamp.clone(),
            started_at: self.started_at,
            instance_path: instance_path.to_path_buf(),
            catalog_path: catalog_path.to_path_buf(),
            model: model.clone(),
            solver: solver.clone(),
            status: "PENDING".to_string(),
            objective_value: None,
            files: Vec::new(),
        }
    }

    fn write_json<T: Serialize>(&self, stem: &str, value: &T) -> ReportResult<PathBuf> {
        let path = self.file(stem, "json");
        write_text(&path, &serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }
}

fn write_text(path: &Path, content: &str) -> ReportResult<()> {
    std::fs::write(path, content).map_err(|e| ReportError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_folder_name_and_file_stamps() {
        let dir = tempfile::tempdir().unwrap();
        let at = Local.with_ymd_and_hms(2022, 5, 24, 16, 48, 20).unwrap();
        let folder = ResultsFolder::create_at(&dir.path().join("QIP_RESULTS"), at).unwrap();

        assert_eq!(folder.stamp(), "24_05_2022_16-48-20");
        assert!(folder.path().ends_with("QIP_RESULTS_24_05_2022_16-48-20"));
        assert!(folder.path().is_dir());
        assert_eq!(
            folder.log_path().file_name().unwrap(),
            "qip_logs_24_05_2022_16-48-20.log"
        );
    }

    #[test]
    fn test_manifest_lists_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let folder = ResultsFolder::create(&dir.path().join("run")).unwrap();
        let details = SolveDetails {
            problem_type: "MIQP".to_string(),
            status: "integer optimal solution".to_string(),
            elapsed_time: 0.5,
            relative_gap: Some(0.0),
            iteration_count: None,
            hit_time_limit: false,
            objective_value: 38.0,
        };
        folder.write_solve_details(&details).unwrap();

        let mut manifest = folder.manifest(
            Path::new("instance.json"),
            Path::new("catalog.json"),
            &ModelParameters::default(),
            &SolverConfig::default(),
        );
        let path = folder.write_manifest(&mut manifest).unwrap();

        assert_eq!(manifest.files.len(), 1);
        assert!(manifest.files[0].starts_with("qip_solve_details_"));
        let raw = std::fs::read_to_string(path).unwrap();
        let back: RunManifest = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.run_id, folder.run_id());
    }
}
