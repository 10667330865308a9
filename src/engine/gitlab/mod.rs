//! 基于 GitLab REST API 的分析引擎

pub mod aggregate;
pub mod client;
pub mod models;
pub mod stats;

pub use aggregate::AuthorAggregator;
pub use client::{GitLabClient, RequestContext};

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use std::sync::Mutex;

use self::models::{Commit, DiffInfo, Project, RefInfo};
use self::stats::{diff_stats, BranchInfo};
use super::config::RunConfig;
use super::AnalysisEngine;
use crate::diagnostics::DiagnosticSink;
use crate::infrastructure::error::AnalysisError;
use crate::infrastructure::network::{build_http_client, NetworkConfig};
use crate::report::model::RawReport;
use crate::{diag_error, diag_info};

const COMMITS_PER_PAGE: &str = "100";

/// GitLab 分析引擎
pub struct GitLabEngine {
    http: Client,
    network: NetworkConfig,
}

impl GitLabEngine {
    pub fn new(network: NetworkConfig) -> Result<Self, AnalysisError> {
        let http = build_http_client(&network)?;
        Ok(Self { http, network })
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[async_trait]
impl AnalysisEngine for GitLabEngine {
    async fn run_analysis(
        &self,
        config: &RunConfig,
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<RawReport, AnalysisError> {
        config.validate()?;

        let client = GitLabClient::new(&self.http, &config.gitlab_api, &config.gitlab_token, &self.network)?;
        let run = AnalysisRun {
            client: &client,
            config,
            diagnostics,
            authors: Mutex::new(AuthorAggregator::new()),
        };

        let projects = run.group_projects().await?;
        diag_info!(diagnostics, format!("[获取项目成功] 本次分析 {} 个项目", projects.len()));

        let selected: Vec<&Project> = projects.iter().filter(|p| !config.is_excluded(&p.name)).collect();
        for chunk in selected.chunks(chunk_size(config)) {
            join_all(chunk.iter().map(|project| run.process_project(project))).await;
        }

        let authors = match run.authors.into_inner() {
            Ok(authors) => authors,
            Err(poisoned) => poisoned.into_inner(),
        };
        let report = authors.into_report(client.take_failures());
        diagnostics.info("[生成报告成功！]");

        Ok(report)
    }
}

fn chunk_size(config: &RunConfig) -> usize {
    config.max_concurrent_requests.max(1) as usize
}

/// 单次运行的共享状态
struct AnalysisRun<'a> {
    client: &'a GitLabClient<'a>,
    config: &'a RunConfig,
    diagnostics: &'a dyn DiagnosticSink,
    authors: Mutex<AuthorAggregator>,
}

impl AnalysisRun<'_> {
    async fn group_projects(&self) -> Result<Vec<Project>, AnalysisError> {
        self.diagnostics.info("开始获取项目...");

        let per_page = self.config.projects_num.to_string();
        let url = self.client.endpoint(
            &["groups", &self.config.group_id, "projects"],
            &[
                ("per_page", per_page.as_str()),
                ("include_subgroups", "true"),
                ("order_by", "last_activity_at"),
                ("sort", "desc"),
            ],
        );

        self.client
            .get_json(url, &RequestContext::new("获取项目列表..."), self.diagnostics)
            .await
    }

    /// 项目失败只记录日志，不中断整次运行
    async fn process_project(&self, project: &Project) {
        diag_info!(self.diagnostics, "开始分析项目...", project.name);

        let commits = match self.project_commits(project).await {
            Ok(commits) => commits,
            Err(e) => {
                diag_error!(self.diagnostics, format!("[分析项目{}失败]", project.name), e);
                return;
            }
        };

        for chunk in commits.chunks(chunk_size(self.config)) {
            join_all(chunk.iter().map(|commit| self.process_commit(project, commit))).await;
        }

        self.diagnostics.info(&format!("[分析项目{}完成]", project.name));
    }

    /// 逐页获取提交，直到返回空页
    async fn project_commits(&self, project: &Project) -> Result<Vec<Commit>, AnalysisError> {
        let project_id = project.id.to_string();
        let context = RequestContext::new("获取提交记录").project(&project.name);
        let mut all_commits = Vec::new();
        let mut page = 1u32;

        loop {
            let page_str = page.to_string();
            let url = self.client.endpoint(
                &["projects", &project_id, "repository", "commits"],
                &[
                    ("since", self.config.start_date.as_str()),
                    ("until", self.config.end_date.as_str()),
                    ("per_page", COMMITS_PER_PAGE),
                    ("page", page_str.as_str()),
                    ("all", "true"),
                ],
            );

            let commits: Vec<Commit> = self.client.get_json(url, &context, self.diagnostics).await?;
            if commits.is_empty() {
                break;
            }

            all_commits.extend(commits);
            page += 1;
        }

        tracing::debug!(project = %project.name, commits = all_commits.len(), "提交记录获取完成");
        Ok(all_commits)
    }

    async fn process_commit(&self, project: &Project, commit: &Commit) {
        let project_id = project.id.to_string();
        let context = RequestContext::new("获取提交差异")
            .project(&project.name)
            .author(&commit.author_email);

        let diff_url = self
            .client
            .endpoint(&["projects", &project_id, "repository", "commits", &commit.id, "diff"], &[]);
        let diffs: Vec<DiffInfo> = match self.client.get_json(diff_url, &context, self.diagnostics).await {
            Ok(diffs) => diffs,
            Err(e) => {
                tracing::debug!(sha = %commit.id, error = %e, "跳过提交");
                return;
            }
        };
        let stats = diff_stats(&diffs, self.config);

        let context = RequestContext {
            operation: "获取提交对应的分支信息".to_string(),
            ..context
        };
        let refs_url = self
            .client
            .endpoint(&["projects", &project_id, "repository", "commits", &commit.id, "refs"], &[]);
        let refs: Vec<RefInfo> = match self.client.get_json(refs_url, &context, self.diagnostics).await {
            Ok(refs) => refs,
            Err(e) => {
                tracing::debug!(sha = %commit.id, error = %e, "跳过提交");
                return;
            }
        };
        let branch = BranchInfo::resolve(&refs, &commit.message);

        match self.authors.lock() {
            Ok(mut authors) => authors.record(&project.name, commit, &stats, branch),
            Err(poisoned) => poisoned.into_inner().record(&project.name, commit, &stats, branch),
        }
    }
}
