// ==========================================
// 会议论文排程系统 - 命令行主入口
// ==========================================
// 用法: conference-scheduler <run_config.json>
// 流程: 加载配置 -> 打开运行日志 -> 加载实例/目录
//      -> build -> solve -> summary -> create_schedule -> 结果落盘
// ==========================================

use anyhow::{Context, Result};
use conference_scheduler::config::RunConfig;
use conference_scheduler::engine::{GoodLpAdapter, QipScheduler};
use conference_scheduler::importer::InstanceLoader;
use conference_scheduler::logging::RunLog;
use conference_scheduler::report::{ConsoleScheduleRenderer, ResultsFolder, ScheduleRenderer};
use std::path::PathBuf;
use tracing::{error, info};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("用法: conference-scheduler <run_config.json>")?;

    let config = RunConfig::load(&config_path)
        .with_context(|| format!("无法加载运行配置: {}", config_path.display()))?;

    let folder = if config.output.save_results {
        Some(ResultsFolder::create(&config.output.results_dir).context("无法创建结果目录")?)
    } else {
        None
    };

    let log_path = folder.as_ref().map(|f| f.log_path());
    let run_log =
        RunLog::open(log_path.as_deref(), config.output.log_format).context("无法打开运行日志")?;

    let result = run_log.scope(|| {
        let result = run(&config, folder.as_ref());
        if let Err(e) = &result {
            error!("运行失败: {:#}", e);
        }
        result
    });

    run_log.close().context("无法关闭运行日志")?;
    result
}

fn run(config: &RunConfig, folder: Option<&ResultsFolder>) -> Result<()> {
    info!("==================================================");
    info!("{}", conference_scheduler::APP_NAME);
    info!("系统版本: {}", conference_scheduler::VERSION);
    info!("==================================================");

    let loader = InstanceLoader::new();
    let instance = loader
        .load_instance(&config.instance_path)
        .context("无法加载实例数据")?;
    let catalog = loader
        .load_catalog(&config.catalog_path)
        .context("无法加载论文目录")?;

    let mut manifest = folder.map(|f| {
        f.manifest(
            &config.instance_path,
            &config.catalog_path,
            &config.model,
            &config.solver,
        )
    });

    let mut scheduler = QipScheduler::new(
        &instance,
        config.model.clone(),
        GoodLpAdapter::new(),
        config.solver.clone(),
    );

    // BUILD QIP
    let model = scheduler.build().context("QIP 构建失败")?;
    if let Some(folder) = folder {
        folder.write_model_listings(model)?;
    }

    // SOLVE QIP
    let solved = scheduler.solve().map(|_| ());
    if let Err(e) = solved {
        scheduler.summary()?;
        if let (Some(folder), Some(manifest)) = (folder, manifest.as_mut()) {
            manifest.status = scheduler
                .outcome()
                .map(|o| o.status_label().to_string())
                .unwrap_or_else(|| "FAILED".to_string());
            folder.write_manifest(manifest)?;
        }
        return Err(e).context("QIP 求解未产生排程");
    }
    scheduler.summary()?;
    scheduler.check_paper_allocation()?;

    // CREATE SCHEDULE
    let schedule = scheduler
        .create_schedule(&catalog)
        .context("排程组装失败")?
        .clone();

    let listing = ConsoleScheduleRenderer::new().render(&schedule)?;
    for line in listing.lines() {
        info!("{}", line);
    }

    if let (Some(folder), Some(manifest)) = (folder, manifest.as_mut()) {
        if let Some(record) = scheduler.solution_record() {
            folder.write_solution(&record)?;
        }
        if let Some(solution) = scheduler.solution() {
            folder.write_solve_details(&solution.details)?;
            manifest.status = solution.details.status.clone();
            manifest.objective_value = Some(solution.objective_value);
        }
        folder.write_schedule(&schedule)?;
        folder.write_schedule_csv(&schedule, &config.output.schedule_filename)?;
        let path = folder.write_manifest(manifest)?;
        info!(path = %path.display(), "运行结果已保存");
    }

    Ok(())
}
