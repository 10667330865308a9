use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::config::{
    DEFAULT_CONCURRENCY, DEFAULT_IGNORED_PATHS, DEFAULT_PROJECTS_NUM, DEFAULT_VALID_EXTENSIONS,
    MAX_CONCURRENCY, MAX_PROJECTS_NUM,
};
use crate::infrastructure::error::AnalysisError;
use crate::orchestrator::label::MAX_RANGE_DAYS;

/// 应用程序配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// GitLab 连接配置
    pub gitlab: GitLabSettings,

    /// 分析参数默认值
    pub analysis: AnalysisSettings,

    /// 网络请求配置
    pub network: NetworkSettings,

    /// 面板展示配置
    pub dashboard: DashboardSettings,

    /// 日志配置
    pub logging: LoggingSettings,
}

/// GitLab 连接配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitLabSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub group_id: String,
}

/// 分析参数默认值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    pub projects_num: u32,
    pub max_concurrent_requests: u32,
    pub excluded_projects: Vec<String>,
    pub valid_extensions: Vec<String>,
    pub ignored_paths: Vec<String>,
    /// 未指定起止时间时统计最近多少天
    pub default_days: i64,
}

/// 网络请求配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkSettings {
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

/// 面板展示配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardSettings {
    pub scroll_quiet_window_ms: u64,
    pub celebration_duration_ms: u64,
    pub celebration_enabled: bool,
    pub commit_page_size: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
    pub output: String,
    pub file_path: Option<PathBuf>,
    pub include_file_location: bool,
    pub filter: Option<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            projects_num: DEFAULT_PROJECTS_NUM,
            max_concurrent_requests: DEFAULT_CONCURRENCY,
            excluded_projects: Vec::new(),
            valid_extensions: DEFAULT_VALID_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            ignored_paths: DEFAULT_IGNORED_PATHS.iter().map(|s| s.to_string()).collect(),
            default_days: 7,
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
            connect_timeout_ms: 3000,
            max_attempts: 20,
            retry_delay_ms: 300,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            scroll_quiet_window_ms: 100,
            celebration_duration_ms: 3000,
            celebration_enabled: true,
            commit_page_size: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            output: "stderr".to_string(),
            file_path: None,
            include_file_location: false,
            filter: None,
        }
    }
}

/// 配置源
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Default,
    /// `.env` 文件（用户目录与当前目录）
    DotEnv,
    File(PathBuf),
    Environment,
    CommandLine(HashMap<String, String>),
}

/// 配置管理器
pub struct ConfigManager {
    config: AppConfig,
    config_sources: Vec<ConfigSource>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_sources: vec![ConfigSource::Default],
        }
    }

    /// 添加配置源
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.config_sources.push(source);
        self
    }

    /// 加载配置
    pub fn load(&mut self) -> Result<(), AnalysisError> {
        let mut config = AppConfig::default();

        // 按优先级顺序加载配置源
        for source in &self.config_sources {
            match source {
                ConfigSource::Default => {}
                ConfigSource::DotEnv => load_dotenv(),
                ConfigSource::File(path) => {
                    if let Some(file_config) = self.load_from_file(path)? {
                        config = file_config;
                    }
                }
                ConfigSource::Environment => self.load_from_environment(&mut config)?,
                ConfigSource::CommandLine(args) => self.load_from_command_line(&mut config, args)?,
            }
        }

        self.validate_config(&config)?;
        self.config = config;

        Ok(())
    }

    /// 从文件加载配置，文件不存在时跳过
    fn load_from_file(&self, path: &Path) -> Result<Option<AppConfig>, AnalysisError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "配置文件不存在，跳过");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;

        let file_config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| AnalysisError::config(format!("TOML 解析错误: {}", e)))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| AnalysisError::config(format!("YAML 解析错误: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| AnalysisError::config(format!("JSON 解析错误: {}", e)))?,
            _ => return Err(AnalysisError::config("不支持的配置文件格式")),
        };

        Ok(Some(file_config))
    }

    /// 从环境变量加载配置
    fn load_from_environment(&self, config: &mut AppConfig) -> Result<(), AnalysisError> {
        if let Ok(api) = std::env::var("GITLAB_ANALYSIS_API") {
            config.gitlab.api_url = api;
        }
        if let Ok(token) = std::env::var("GITLAB_ANALYSIS_TOKEN") {
            config.gitlab.token = Some(token);
        }
        if let Ok(group_id) = std::env::var("GITLAB_ANALYSIS_GROUP_ID") {
            config.gitlab.group_id = group_id;
        }
        if let Ok(value) = std::env::var("GITLAB_ANALYSIS_PROJECTS_NUM") {
            config.analysis.projects_num = parse_number("GITLAB_ANALYSIS_PROJECTS_NUM", &value)?;
        }
        if let Ok(value) = std::env::var("GITLAB_ANALYSIS_CONCURRENCY") {
            config.analysis.max_concurrent_requests = parse_number("GITLAB_ANALYSIS_CONCURRENCY", &value)?;
        }
        if let Ok(level) = std::env::var("GITLAB_ANALYSIS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }

    /// 从命令行参数加载配置
    fn load_from_command_line(&self, config: &mut AppConfig, args: &HashMap<String, String>) -> Result<(), AnalysisError> {
        for (key, value) in args {
            match key.as_str() {
                "api" => config.gitlab.api_url = value.clone(),
                "token" => config.gitlab.token = Some(value.clone()),
                "group" => config.gitlab.group_id = value.clone(),
                "projects-num" => config.analysis.projects_num = parse_number(key, value)?,
                "concurrency" => config.analysis.max_concurrent_requests = parse_number(key, value)?,
                "log-level" => config.logging.level = value.clone(),
                _ => {
                    // 忽略未知参数
                }
            }
        }

        Ok(())
    }

    /// 验证配置
    fn validate_config(&self, config: &AppConfig) -> Result<(), AnalysisError> {
        let analysis = &config.analysis;
        if analysis.projects_num == 0 || analysis.projects_num > MAX_PROJECTS_NUM {
            return Err(AnalysisError::invalid_field(
                "projects_num",
                format!("项目数量必须在 1 到 {} 之间", MAX_PROJECTS_NUM),
            ));
        }

        if analysis.max_concurrent_requests == 0 || analysis.max_concurrent_requests > MAX_CONCURRENCY {
            return Err(AnalysisError::invalid_field(
                "max_concurrent_requests",
                format!("并发数必须在 1 到 {} 之间", MAX_CONCURRENCY),
            ));
        }

        if !(1..=MAX_RANGE_DAYS).contains(&analysis.default_days) {
            return Err(AnalysisError::invalid_field(
                "default_days",
                format!("默认统计天数必须在 1 到 {} 之间", MAX_RANGE_DAYS),
            ));
        }

        if config.network.max_attempts == 0 {
            return Err(AnalysisError::invalid_field("max_attempts", "最大请求次数不能为 0"));
        }

        if config.network.request_timeout_ms == 0 {
            return Err(AnalysisError::invalid_field("request_timeout_ms", "请求超时时间不能为 0"));
        }

        Ok(())
    }

    /// 获取配置
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path, format: ConfigFormat) -> Result<(), AnalysisError> {
        let content = match format {
            ConfigFormat::Toml => toml::to_string_pretty(&self.config)
                .map_err(|e| AnalysisError::config(format!("TOML 序列化错误: {}", e)))?,
            ConfigFormat::Yaml => serde_yaml::to_string(&self.config)
                .map_err(|e| AnalysisError::config(format!("YAML 序列化错误: {}", e)))?,
            ConfigFormat::Json => serde_json::to_string_pretty(&self.config)
                .map_err(|e| AnalysisError::config(format!("JSON 序列化错误: {}", e)))?,
        };

        std::fs::write(path, content)
            .map_err(|e| AnalysisError::config(format!("无法写入配置文件 {}: {}", path.display(), e)))?;

        Ok(())
    }
}

/// 配置文件格式
#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn load_dotenv() {
    // 用户目录下的配置优先于当前目录
    if let Ok(home) = std::env::var("HOME") {
        let user_env_path = PathBuf::from(home).join(".gitlab-analysis").join(".env");
        if user_env_path.exists() {
            dotenvy::from_path(user_env_path).ok();
        }
    }

    dotenvy::dotenv().ok();
}

fn parse_number(name: &str, value: &str) -> Result<u32, AnalysisError> {
    value
        .trim()
        .parse()
        .map_err(|_| AnalysisError::invalid_field(name, format!("{} 不是有效的数字: {}", name, value)))
}
