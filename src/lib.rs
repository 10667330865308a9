pub mod cli;
pub mod dashboard;
pub mod diagnostics;
pub mod engine;
pub mod infrastructure;
pub mod orchestrator;
pub mod report;

pub use diagnostics::{DiagnosticInterceptor, DiagnosticSink, LogFeed};
pub use engine::{AnalysisEngine, RunConfig};
pub use infrastructure::AnalysisError;
pub use orchestrator::{AnalysisForm, DisplayState, RunOrchestrator, RunOutcome, RunState};
pub use report::{normalize, NormalizedReport, RawReport};
