//! 单次分析运行的参数

use serde::{Deserialize, Serialize};

use crate::infrastructure::error::AnalysisError;

/// 起止时间格式
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_PROJECTS_NUM: u32 = 100;
pub const MAX_PROJECTS_NUM: u32 = 100;
pub const DEFAULT_CONCURRENCY: u32 = 20;
pub const MAX_CONCURRENCY: u32 = 30;

/// 默认统计的文件扩展名
pub const DEFAULT_VALID_EXTENSIONS: &[&str] = &[
    ".js", ".cjs", ".mjs", ".ts", ".jsx", ".tsx", ".css", ".scss", ".sass", ".html", ".sh", ".vue",
    ".svelte", ".rs",
];

/// 默认忽略的路径片段
pub const DEFAULT_IGNORED_PATHS: &[&str] =
    &["dist", "node_modules/", "build/", ".husky", "lintrc", "public/"];

/// 交给分析引擎的运行参数，每次运行重新构建，交出后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub gitlab_api: String,
    pub gitlab_token: String,
    pub group_id: String,
    /// 含起止两端
    pub start_date: String,
    pub end_date: String,
    pub projects_num: u32,
    #[serde(default)]
    pub excluded_projects: Vec<String>,
    pub valid_extensions: Vec<String>,
    #[serde(default)]
    pub ignored_paths: Vec<String>,
    pub max_concurrent_requests: u32,
}

impl RunConfig {
    /// 校验取值范围
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.gitlab_api.trim().is_empty() {
            return Err(AnalysisError::invalid_field("gitlab_api", "请输入 GitLab API 地址"));
        }
        if self.gitlab_token.trim().is_empty() {
            return Err(AnalysisError::invalid_field("gitlab_token", "请输入 GitLab Token"));
        }
        if self.group_id.trim().is_empty() {
            return Err(AnalysisError::invalid_field("group_id", "请输入 Group ID"));
        }
        if self.valid_extensions.is_empty() {
            return Err(AnalysisError::invalid_field("valid_extensions", "请至少选择一种文件类型"));
        }
        if !(1..=MAX_PROJECTS_NUM).contains(&self.projects_num) {
            return Err(AnalysisError::invalid_field(
                "projects_num",
                format!("项目数量必须在 1 到 {} 之间", MAX_PROJECTS_NUM),
            ));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.max_concurrent_requests) {
            return Err(AnalysisError::invalid_field(
                "max_concurrent_requests",
                format!("并发数必须在 1 到 {} 之间", MAX_CONCURRENCY),
            ));
        }

        let start = chrono::NaiveDateTime::parse_from_str(&self.start_date, DATE_FORMAT)
            .map_err(|_| AnalysisError::invalid_field("start_date", format!("无效的开始时间: {}", self.start_date)))?;
        let end = chrono::NaiveDateTime::parse_from_str(&self.end_date, DATE_FORMAT)
            .map_err(|_| AnalysisError::invalid_field("end_date", format!("无效的结束时间: {}", self.end_date)))?;
        if start > end {
            return Err(AnalysisError::invalid_field("start_date", "开始时间不能晚于结束时间"));
        }

        Ok(())
    }

    /// 是否需要统计该文件
    pub fn accepts_path(&self, path: &str) -> bool {
        if self.ignored_paths.iter().any(|ignored| path.contains(ignored.as_str())) {
            return false;
        }

        match path.rfind('.') {
            Some(idx) => {
                let ext = &path[idx..];
                self.valid_extensions.iter().any(|valid| valid == ext)
            }
            None => false,
        }
    }

    pub fn is_excluded(&self, project_name: &str) -> bool {
        self.excluded_projects.iter().any(|p| p == project_name)
    }
}
