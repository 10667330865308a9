pub mod feed;
pub mod interceptor;
pub mod sink;

pub use feed::{FeedCursor, LogFeed, LogLine, Severity};
pub use interceptor::{CaptureGuard, DiagnosticInterceptor};
pub use sink::{join_args, DiagnosticSink, NullSink, TracingSink};
