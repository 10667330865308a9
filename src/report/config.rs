use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 报告配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 报告格式
    pub format: ReportFormat,
    /// 输出路径，未指定时输出到标准输出
    pub output_path: Option<PathBuf>,
    /// 文本报告是否使用终端颜色
    pub use_colors: bool,
    /// 提交表只展示第一页
    pub commit_page_size: Option<usize>,
}

/// 报告格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            output_path: None,
            use_colors: true,
            commit_page_size: None,
        }
    }
}
