pub mod config;
pub mod gitlab;

pub use config::RunConfig;
pub use gitlab::GitLabEngine;

use async_trait::async_trait;

use crate::diagnostics::DiagnosticSink;
use crate::infrastructure::error::AnalysisError;
use crate::report::model::RawReport;

/// 分析引擎
///
/// 进度与错误信息都写入传入的 `diagnostics`，而不是直接输出。
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn run_analysis(
        &self,
        config: &RunConfig,
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<RawReport, AnalysisError>;
}
