use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use gitlab_analysis::cli::Args;
use gitlab_analysis::dashboard::{Celebration, LogPane, ScrollController, TerminalCanvas};
use gitlab_analysis::diagnostics::TracingSink;
use gitlab_analysis::engine::GitLabEngine;
use gitlab_analysis::infrastructure::config::{AppConfig, ConfigManager, ConfigSource};
use gitlab_analysis::infrastructure::logging::{setup_logging, LoggingConfig};
use gitlab_analysis::infrastructure::network::NetworkConfig;
use gitlab_analysis::orchestrator::label::days_before;
use gitlab_analysis::orchestrator::{AnalysisForm, RunOrchestrator, RunOutcome};
use gitlab_analysis::report::{DashboardView, ReportConfig, ReportFormat, ReportGenerator};

const DEFAULT_CONFIG_FILE: &str = "gitlab-analysis.toml";

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let config_path = match &args.config {
        Some(path) if !path.exists() => anyhow::bail!("配置文件不存在: {}", path.display()),
        Some(path) => path.clone(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let mut manager = ConfigManager::new()
        .add_source(ConfigSource::DotEnv)
        .add_source(ConfigSource::File(config_path))
        .add_source(ConfigSource::Environment)
        .add_source(ConfigSource::CommandLine(args.config_overrides()));
    manager.load().context("加载配置失败")?;

    Ok(manager.get_config().clone())
}

/// 配置给出默认值，命令行参数覆盖
fn build_form(args: &Args, config: &AppConfig) -> anyhow::Result<AnalysisForm> {
    let mut form = AnalysisForm::from_config(config)?;

    let days = args.days.unwrap_or(config.analysis.default_days);
    form.end = args.until.unwrap_or_else(|| Local::now().naive_local());
    form.start = match args.since {
        Some(since) => since,
        None => days_before(form.end, days)?,
    };

    if !args.exclude.is_empty() {
        form.excluded_projects = args.exclude.clone();
    }
    if !args.ext.is_empty() {
        form.valid_extensions = args.ext.clone();
    }
    if !args.ignore.is_empty() {
        form.ignored_paths = args.ignore.clone();
    }

    Ok(form)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    setup_logging(LoggingConfig::from_settings(&config.logging))?;

    let form = build_form(&args, &config)?;
    let engine = GitLabEngine::new(NetworkConfig::from(&config.network))?;
    let orchestrator = Arc::new(RunOrchestrator::new(Arc::new(engine), Arc::new(TracingSink)));

    // 日志面板跟随日志自动滚动
    let stderr_is_terminal = std::io::stderr().is_terminal();
    let pane = Arc::new(LogPane::stderr(orchestrator.log_feed(), stderr_is_terminal));
    let scroll = ScrollController::attach_with_quiet_window(
        pane,
        orchestrator.log_feed().subscribe(),
        std::time::Duration::from_millis(config.dashboard.scroll_quiet_window_ms),
    );

    let outcome = orchestrator.submit(&form).await?;
    scroll.flush();
    drop(scroll);

    if let RunOutcome::Failed { error } = &outcome {
        anyhow::bail!("分析失败: {}", error);
    }

    if config.dashboard.celebration_enabled && !args.no_celebration && stderr_is_terminal {
        let finished = Arc::clone(&orchestrator);
        let celebration = Celebration::start(
            std::time::Duration::from_millis(config.dashboard.celebration_duration_ms),
            TerminalCanvas::stderr(),
            move || finished.finish_celebration(),
        );
        celebration.wait().await;
    } else {
        orchestrator.finish_celebration();
    }

    if args.collapse {
        orchestrator.collapse_all();
    }

    let state = orchestrator.snapshot();
    let view = DashboardView::new(&state.results, &state.expansion, &state.date_range)
        .with_author_filter(args.author.as_deref());

    let generator = ReportGenerator::new(ReportConfig {
        format: args.format,
        output_path: args.output.clone(),
        use_colors: args.output.is_none() && std::io::stdout().is_terminal(),
        commit_page_size: (args.format == ReportFormat::Text && args.output.is_none())
            .then_some(config.dashboard.commit_page_size),
    });

    if args.output.is_some() {
        let report = generator.write(&view).await.context("写入报告失败")?;
        eprintln!("✅ 报告已保存到: {} ({} 字节)", report.path.display(), report.size);
    } else {
        println!("{}", generator.generate_content(&view)?);
    }

    Ok(())
}
