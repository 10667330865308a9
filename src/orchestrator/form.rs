use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::label::{days_before, DateRangeLabel, DEFAULT_RANGE_DAYS};
use crate::engine::config::{
    RunConfig, DEFAULT_CONCURRENCY, DEFAULT_IGNORED_PATHS, DEFAULT_PROJECTS_NUM,
    DEFAULT_VALID_EXTENSIONS, MAX_CONCURRENCY, MAX_PROJECTS_NUM,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::AnalysisError;

/// 分析表单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisForm {
    pub gitlab_api: String,
    pub gitlab_token: String,
    pub group_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub projects_num: u32,
    pub excluded_projects: Vec<String>,
    pub valid_extensions: Vec<String>,
    pub ignored_paths: Vec<String>,
    pub max_concurrent_requests: u32,
}

impl Default for AnalysisForm {
    fn default() -> Self {
        let end = Local::now().naive_local();
        Self {
            gitlab_api: String::new(),
            gitlab_token: String::new(),
            group_id: String::new(),
            start: end - Duration::days(DEFAULT_RANGE_DAYS),
            end,
            projects_num: DEFAULT_PROJECTS_NUM,
            excluded_projects: Vec::new(),
            valid_extensions: DEFAULT_VALID_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            ignored_paths: DEFAULT_IGNORED_PATHS.iter().map(|s| s.to_string()).collect(),
            max_concurrent_requests: DEFAULT_CONCURRENCY,
        }
    }
}

impl AnalysisForm {
    /// 以应用配置填充表单，统计区间为最近 `default_days` 天
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        let end = Local::now().naive_local();
        let analysis = &config.analysis;

        Ok(Self {
            gitlab_api: config.gitlab.api_url.clone(),
            gitlab_token: config.gitlab.token.clone().unwrap_or_default(),
            group_id: config.gitlab.group_id.clone(),
            start: days_before(end, analysis.default_days)?,
            end,
            projects_num: analysis.projects_num,
            excluded_projects: analysis.excluded_projects.clone(),
            valid_extensions: analysis.valid_extensions.clone(),
            ignored_paths: analysis.ignored_paths.clone(),
            max_concurrent_requests: analysis.max_concurrent_requests,
        })
    }

    /// 提交前校验
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
        if self.start > self.end {
            return Err(AnalysisError::invalid_field("start_date", "开始时间不能晚于结束时间"));
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

        Ok(())
    }

    pub fn date_range(&self) -> DateRangeLabel {
        DateRangeLabel::from_range(self.start, self.end)
    }

    /// 构建本次运行的参数
    pub fn to_run_config(&self) -> RunConfig {
        let range = self.date_range();
        RunConfig {
            gitlab_api: self.gitlab_api.trim().to_string(),
            gitlab_token: self.gitlab_token.trim().to_string(),
            group_id: self.group_id.trim().to_string(),
            start_date: range.start().to_string(),
            end_date: range.end().to_string(),
            projects_num: self.projects_num,
            excluded_projects: self.excluded_projects.clone(),
            valid_extensions: self.valid_extensions.clone(),
            ignored_paths: self.ignored_paths.clone(),
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }
}
