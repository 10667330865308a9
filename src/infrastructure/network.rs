use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::infrastructure::config::NetworkSettings;
use crate::infrastructure::error::AnalysisError;

/// 网络客户端配置
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// 单次请求超时
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// 每个请求的最大尝试次数
    pub max_attempts: u32,
    /// 两次尝试之间的等待
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::from(&NetworkSettings::default())
    }
}

impl From<&NetworkSettings> for NetworkConfig {
    fn from(settings: &NetworkSettings) -> Self {
        Self {
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms),
            max_attempts: settings.max_attempts.max(1),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            user_agent: format!("gitlab-analysis/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// 构建 HTTP 客户端
///
/// 单次请求的超时由调用方控制，以便区分超时与其他网络错误。
pub fn build_http_client(config: &NetworkConfig) -> Result<Client, AnalysisError> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| AnalysisError::network(format!("Failed to create HTTP client: {}", e), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_config_default() {
        let config = NetworkConfig::default();
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.max_attempts, 20);
        assert_eq!(config.retry_delay, Duration::from_millis(300));
        assert!(config.user_agent.starts_with("gitlab-analysis/"));
    }

    #[test]
    fn test_zero_attempts_is_clamped() {
        let settings = NetworkSettings {
            max_attempts: 0,
            ..NetworkSettings::default()
        };
        assert_eq!(NetworkConfig::from(&settings).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_build_http_client() {
        assert!(build_http_client(&NetworkConfig::default()).is_ok());
    }
}
