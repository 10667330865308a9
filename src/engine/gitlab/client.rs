use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use url::Url;

use crate::diagnostics::DiagnosticSink;
use crate::infrastructure::error::AnalysisError;
use crate::infrastructure::network::NetworkConfig;
use crate::report::model::FailureStat;

/// 请求上下文，用于失败记录
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub operation: String,
    pub project_name: Option<String>,
    pub author: Option<String>,
}

impl RequestContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn project(mut self, name: &str) -> Self {
        self.project_name = Some(name.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }
}

/// 单次运行使用的 GitLab API 客户端
///
/// 每个请求带有单次超时与重试；最终失败的请求记入失败列表。
pub struct GitLabClient<'a> {
    http: &'a Client,
    base: Url,
    token: String,
    network: &'a NetworkConfig,
    failures: Arc<Mutex<Vec<FailureStat>>>,
}

impl<'a> GitLabClient<'a> {
    pub fn new(
        http: &'a Client,
        api: &str,
        token: &str,
        network: &'a NetworkConfig,
    ) -> Result<Self, AnalysisError> {
        let base = Url::parse(api.trim_end_matches('/'))?;
        if base.cannot_be_a_base() {
            return Err(AnalysisError::invalid_field("gitlab_api", format!("无效的 URL: {}", api)));
        }

        Ok(Self {
            http,
            base,
            token: token.to_string(),
            network,
            failures: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// 拼接 API 路径与查询参数
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// 带重试的 GET 请求
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &RequestContext,
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<T, AnalysisError> {
        let max_attempts = self.network.max_attempts.max(1);
        let timeout_ms = self.network.request_timeout.as_millis() as u64;
        let mut last_error = None;
        let mut attempts = 0;

        while attempts < max_attempts {
            attempts += 1;
            let started = Instant::now();

            let result = match tokio::time::timeout(self.network.request_timeout, self.fetch(&url)).await {
                Ok(result) => result,
                Err(_) => Err(AnalysisError::timeout(
                    format!("{}，第{}次请求失败", context.operation, attempts),
                    timeout_ms,
                )),
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            diagnostics.error(&format!("[请求失败] 耗时: {}ms", started.elapsed().as_millis()));
            diagnostics.error(&format!("错误信息: {}", error));

            let retryable = error.is_retryable();
            last_error = Some(error);
            if !retryable {
                break;
            }
            if attempts < max_attempts {
                tokio::time::sleep(self.network.retry_delay).await;
            }
        }

        let message = last_error.map(|e| e.to_string()).unwrap_or_default();
        self.record_failure(&url, context, message);

        Err(AnalysisError::RetriesExhausted {
            operation: context.operation.clone(),
            attempts,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> Result<T, AnalysisError> {
        let response = self
            .http
            .get(url.clone())
            .header("Private-Token", &self.token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| AnalysisError::network(e.to_string(), Some(display_url(url))))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                url: display_url(url),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::network(e.to_string(), Some(display_url(url))))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn record_failure(&self, url: &Url, context: &RequestContext, error: String) {
        let failure = FailureStat {
            url: display_url(url),
            project_name: context.project_name.clone(),
            author: context.author.clone(),
            operation: context.operation.clone(),
            error,
        };
        tracing::warn!(url = %failure.url, operation = %failure.operation, "请求最终失败");

        match self.failures.lock() {
            Ok(mut failures) => failures.push(failure),
            Err(poisoned) => poisoned.into_inner().push(failure),
        }
    }

    /// 取出本次运行的失败记录
    pub fn take_failures(&self) -> Vec<FailureStat> {
        match self.failures.lock() {
            Ok(mut failures) => std::mem::take(&mut *failures),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// 失败记录中的 URL 从 `v4/` 开始展示
pub fn display_url(url: &Url) -> String {
    let full = url.as_str();
    match full.find("v4/") {
        Some(idx) => full[idx..].to_string(),
        None => full.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use std::time::Duration;

    fn network() -> NetworkConfig {
        NetworkConfig {
            max_attempts: 2,
            retry_delay: Duration::from_millis(1),
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let http = Client::new();
        let network = network();
        let client = GitLabClient::new(&http, "https://gitlab.example.com/api/v4/", "t", &network).unwrap();

        let url = client.endpoint(
            &["projects", "42", "repository", "commits"],
            &[("since", "2024-01-01 00:00:00"), ("page", "1")],
        );
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/42/repository/commits?since=2024-01-01+00%3A00%3A00&page=1"
        );
        assert_eq!(display_url(&url), "v4/projects/42/repository/commits?since=2024-01-01+00%3A00%3A00&page=1");
    }

    #[test]
    fn test_invalid_api_url() {
        let http = Client::new();
        let network = network();
        assert!(GitLabClient::new(&http, "not a url", "t", &network).is_err());
        assert!(GitLabClient::new(&http, "mailto:someone@example.com", "t", &network).is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_records_failure() {
        let http = Client::new();
        let network = network();
        // 端口 9 通常没有服务监听
        let client = GitLabClient::new(&http, "http://127.0.0.1:9/api/v4", "t", &network).unwrap();
        let url = client.endpoint(&["groups", "1", "projects"], &[]);

        let result: Result<Vec<serde_json::Value>, _> = client
            .get_json(url, &RequestContext::new("获取项目列表").project("web"), &NullSink)
            .await;

        assert!(matches!(result, Err(AnalysisError::RetriesExhausted { attempts: 2, .. })));
        let failures = client.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].url, "v4/groups/1/projects");
        assert_eq!(failures[0].project_name.as_deref(), Some("web"));
        assert!(client.take_failures().is_empty());
    }
}
