// ==========================================
// 会议论文排程系统 - 实例加载器
// ==========================================
// 职责: 读写 InstanceData / PaperCatalog 的 JSON 文件
// 红线: 加载后立即校验,非法实例不进入建模
// ==========================================

use crate::domain::catalog::PaperCatalog;
use crate::domain::instance::InstanceData;
use crate::importer::error::{ImportError, ImportResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{info, instrument};

// ==========================================
// InstanceLoader - 实例加载器
// ==========================================
pub struct InstanceLoader {
    // 无状态
}

impl InstanceLoader {
    pub fn new() -> Self {
        Self {}
    }

    /// 加载并校验实例数据
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_instance(&self, path: &Path) -> ImportResult<InstanceData> {
        let instance: InstanceData = read_json(path)?;
        instance.validate()?;

        info!(
            sessions = instance.session_ids.len(),
            tracks = instance.track_ids.len(),
            papers = instance.paper_ids.len(),
            bidders = instance.bidder_ids.len(),
            authors = instance.author_ids.len(),
            topics = instance.topic_ids.len(),
            "实例数据加载完成"
        );
        Ok(instance)
    }

    /// 加载论文元数据目录
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_catalog(&self, path: &Path) -> ImportResult<PaperCatalog> {
        let catalog: PaperCatalog = read_json(path)?;
        info!(papers = catalog.len(), "论文目录加载完成");
        Ok(catalog)
    }

    /// 保存实例数据 (测试数据生成器使用)
    pub fn save_instance(&self, instance: &InstanceData, path: &Path) -> ImportResult<()> {
        write_json(instance, path)
    }

    /// 保存论文元数据目录
    pub fn save_catalog(&self, catalog: &PaperCatalog, path: &Path) -> ImportResult<()> {
        write_json(catalog, path)
    }
}

impl Default for InstanceLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ImportResult<T> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| ImportError::JsonParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> ImportResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| ImportError::FileWriteError(e.to_string()))
}
