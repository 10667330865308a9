use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

use crate::report::config::{ReportConfig, ReportFormat};
use crate::report::formatters::{
    DashboardView, JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter,
};

/// 报告生成器
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    /// 创建新的报告生成器
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// 生成报告内容（不写入文件）
    pub fn generate_content(&self, view: &DashboardView<'_>) -> Result<String> {
        let view = DashboardView {
            commit_page_size: self.config.commit_page_size.or(view.commit_page_size),
            ..*view
        };
        self.create_formatter().format(&view)
    }

    /// 生成报告并写入配置的输出路径
    pub async fn write(&self, view: &DashboardView<'_>) -> Result<GeneratedReport> {
        let content = self.generate_content(view)?;
        let path = self
            .config
            .output_path
            .clone()
            .unwrap_or_else(|| self.default_output_path());

        // 确保输出目录存在
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }

        fs::write(&path, &content)
            .await
            .with_context(|| format!("Failed to write report to: {:?}", path))?;

        Ok(GeneratedReport {
            path,
            format: self.config.format,
            size: content.len(),
        })
    }

    /// 创建格式化器
    fn create_formatter(&self) -> Box<dyn ReportFormatter> {
        match self.config.format {
            ReportFormat::Text if self.config.use_colors => Box::new(TextFormatter::new()),
            ReportFormat::Text => Box::new(TextFormatter::new_no_color()),
            ReportFormat::Markdown => Box::new(MarkdownFormatter::new()),
            ReportFormat::Json => Box::new(JsonFormatter::new()),
        }
    }

    fn default_output_path(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!(
            "gitlab-analysis-{}.{}",
            timestamp,
            self.config.format.extension()
        ))
    }
}

/// 生成的报告
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    /// 报告文件路径
    pub path: PathBuf,
    /// 报告格式
    pub format: ReportFormat,
    /// 文件大小（字节）
    pub size: usize,
}
