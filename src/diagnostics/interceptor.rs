use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::feed::{LogFeed, Severity};
use super::sink::DiagnosticSink;

/// 诊断拦截器
///
/// 捕获期间每次调用都会原样转发给原始通道，同时以一行追加到日志中。
/// 捕获结束后只转发，不再写日志。
pub struct DiagnosticInterceptor {
    original: Arc<dyn DiagnosticSink>,
    feed: LogFeed,
    captures: AtomicUsize,
}

impl DiagnosticInterceptor {
    pub fn new(original: Arc<dyn DiagnosticSink>, feed: LogFeed) -> Self {
        Self {
            original,
            feed,
            captures: AtomicUsize::new(0),
        }
    }

    /// 开始捕获，返回的守卫释放时结束捕获
    pub fn capture(&self) -> CaptureGuard<'_> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        CaptureGuard { interceptor: self }
    }

    pub fn is_capturing(&self) -> bool {
        self.captures.load(Ordering::SeqCst) > 0
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    fn record(&self, severity: Severity, line: &str) {
        if self.is_capturing() {
            self.feed.append(severity, line);
        }
    }
}

impl DiagnosticSink for DiagnosticInterceptor {
    fn info(&self, line: &str) {
        self.original.info(line);
        self.record(Severity::Info, line);
    }

    fn error(&self, line: &str) {
        self.original.error(line);
        self.record(Severity::Error, line);
    }
}

/// 捕获守卫
#[must_use = "捕获在守卫释放时立即结束"]
pub struct CaptureGuard<'a> {
    interceptor: &'a DiagnosticInterceptor,
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.interceptor.captures.fetch_sub(1, Ordering::SeqCst);
    }
}
