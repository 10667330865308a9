pub mod config;
pub mod error;
pub mod logging;
pub mod network;

pub use config::{AppConfig, ConfigManager, ConfigSource};
pub use error::AnalysisError;
pub use logging::{setup_logging, LoggingConfig, RunTracker};
pub use network::NetworkConfig;
