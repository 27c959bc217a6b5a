// ==========================================
// 日志系统
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// ==========================================
// RunLog: 单次运行的日志器
// - open 时建立 (控制台 + 可选日志文件)
// - scope 内执行的代码写入该日志器
// - close 时落盘并结束
// 库代码不安装全局 subscriber
// ==========================================

use crate::config::LogFormat;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// 单次运行的日志器
pub struct RunLog {
    dispatch: Dispatch,
    file: Option<(PathBuf, File)>,
}

impl RunLog {
    /// 建立运行日志
    ///
    /// # 参数
    /// - log_file: 日志文件路径 (None 表示只输出到控制台)
    /// - format: 日志文件格式 (控制台始终为文本)
    ///
    /// # 环境变量
    /// - RUST_LOG: 日志级别过滤器（默认: info）
    ///   例如: RUST_LOG=debug 或 RUST_LOG=conference_scheduler=trace
    pub fn open(log_file: Option<&Path>, format: LogFormat) -> io::Result<Self> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let console = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true);

        let (file, text_layer, json_layer) = match log_file {
            Some(path) => {
                let writer = File::create(path)?;
                let handle = writer.try_clone()?;
                let (text, json) = match format {
                    LogFormat::Text => (
                        Some(
                            fmt::layer()
                                .with_ansi(false)
                                .with_target(false)
                                .with_writer(Mutex::new(writer)),
                        ),
                        None,
                    ),
                    LogFormat::Json => (
                        None,
                        Some(fmt::layer().json().with_writer(Mutex::new(writer))),
                    ),
                };
                (Some((path.to_path_buf(), handle)), text, json)
            }
            None => (None, None, None),
        };

        let subscriber = Registry::default()
            .with(filter)
            .with(console)
            .with(text_layer)
            .with(json_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            file,
        })
    }

    /// 日志文件路径
    pub fn log_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// 在本日志器下执行
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// 结束运行日志 (日志文件落盘)
    pub fn close(self) -> io::Result<()> {
        self.scope(|| tracing::debug!("运行日志关闭"));
        if let Some((_, file)) = self.file {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
