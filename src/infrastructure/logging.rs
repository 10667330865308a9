use std::io;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Instant;

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::infrastructure::config::LoggingSettings;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    pub include_file_location: bool,
    pub include_thread_names: bool,
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            include_file_location: false,
            include_thread_names: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// 从配置文件中的日志设置构建
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        let output = match (settings.output.as_str(), &settings.file_path) {
            ("file", Some(path)) => LogOutput::File(path.display().to_string()),
            ("stdout", _) => LogOutput::Stdout,
            _ => LogOutput::Stderr,
        };

        Self {
            level: Level::from_str(&settings.level).unwrap_or(Level::WARN),
            format: LogFormat::from_name(&settings.format),
            output,
            include_file_location: settings.include_file_location,
            include_thread_names: false,
            filter: settings.filter.clone(),
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式
    Json,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// 日志输出目标
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File(String),
}

/// 设置日志系统
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = build_env_filter(&config)?;

    let fmt_layer = match &config.output {
        LogOutput::Stdout => create_fmt_layer(&config, io::stdout),
        LogOutput::Stderr => create_fmt_layer(&config, io::stderr),
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            create_fmt_layer(&config, Mutex::new(file))
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter))
        .try_init()?;

    Ok(())
}

fn build_env_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = &config.filter {
        return Ok(EnvFilter::try_new(filter)?);
    }

    let directive = format!(
        "gitlab_analysis={}",
        config.level.as_str().to_ascii_lowercase()
    );
    Ok(EnvFilter::from_default_env().add_directive(directive.parse()?))
}

fn create_fmt_layer<W>(config: &LoggingConfig, make_writer: W) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(make_writer)
        .with_target(true)
        .with_level(true)
        .with_thread_names(config.include_thread_names)
        .with_file(config.include_file_location)
        .with_line_number(config.include_file_location);

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// 分析运行跟踪
pub struct RunTracker {
    run_id: uuid::Uuid,
    start_time: Instant,
}

impl RunTracker {
    pub fn start(group_id: &str) -> Self {
        let run_id = uuid::Uuid::new_v4();
        tracing::info!(run_id = %run_id, group_id, "开始分析运行");

        Self {
            run_id,
            start_time: Instant::now(),
        }
    }

    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    pub fn complete(self, success: bool, authors: usize) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;

        if success {
            tracing::info!(run_id = %self.run_id, duration_ms, authors, "分析运行完成");
        } else {
            tracing::error!(run_id = %self.run_id, duration_ms, "分析运行失败");
        }
    }
}
