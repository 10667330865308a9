use std::fmt;
use std::sync::Arc;

/// 诊断输出通道
///
/// 分析引擎与编排器都通过注入的 sink 输出进度与错误，而不是直接写全局输出。
pub trait DiagnosticSink: Send + Sync {
    fn info(&self, line: &str);

    fn error(&self, line: &str);

    /// 多个参数以单个空格拼接为一行
    fn info_args(&self, args: &[&dyn fmt::Display]) {
        self.info(&join_args(args));
    }

    fn error_args(&self, args: &[&dyn fmt::Display]) {
        self.error(&join_args(args));
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn info(&self, line: &str) {
        (**self).info(line);
    }

    fn error(&self, line: &str) {
        (**self).error(line);
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn info(&self, line: &str) {
        (**self).info(line);
    }

    fn error(&self, line: &str) {
        (**self).error(line);
    }
}

/// 以单个空格拼接参数
pub fn join_args(args: &[&dyn fmt::Display]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 输出一条 INFO 诊断，多个参数拼接为一行
#[macro_export]
macro_rules! diag_info {
    ($sink:expr, $($arg:expr),+ $(,)?) => {
        $crate::diagnostics::DiagnosticSink::info_args(
            &$sink,
            &[$(&$arg as &dyn ::std::fmt::Display),+],
        )
    };
}

/// 输出一条 ERROR 诊断，多个参数拼接为一行
#[macro_export]
macro_rules! diag_error {
    ($sink:expr, $($arg:expr),+ $(,)?) => {
        $crate::diagnostics::DiagnosticSink::error_args(
            &$sink,
            &[$(&$arg as &dyn ::std::fmt::Display),+],
        )
    };
}

/// 转发到 tracing 的默认通道
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn info(&self, line: &str) {
        tracing::info!(target: "gitlab_analysis::diagnostics", "{}", line);
    }

    fn error(&self, line: &str) {
        tracing::error!(target: "gitlab_analysis::diagnostics", "{}", line);
    }
}

/// 丢弃所有输出
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn info(&self, _line: &str) {}

    fn error(&self, _line: &str) {}
}
