pub mod chart;
pub mod commits;
pub mod config;
pub mod expansion;
pub mod formatters;
pub mod generator;
pub mod model;
pub mod normalize;

pub use config::{ReportConfig, ReportFormat};
pub use expansion::ExpansionState;
pub use formatters::{DashboardView, ReportFormatter};
pub use generator::{GeneratedReport, ReportGenerator};
pub use model::{CodeStat, CommitStat, FailureStat, RawReport};
pub use normalize::{normalize, NormalizedReport};
