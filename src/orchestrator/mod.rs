//! 分析运行编排：表单 → 引擎 → 结果整理 → 展示状态

pub mod form;
pub mod label;
pub mod state;

pub use form::AnalysisForm;
pub use label::DateRangeLabel;
pub use state::{DisplayState, RunOutcome, RunState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::diag_error;
use crate::diagnostics::{DiagnosticInterceptor, DiagnosticSink, LogFeed};
use crate::engine::AnalysisEngine;
use crate::infrastructure::error::AnalysisError;
use crate::infrastructure::logging::RunTracker;
use crate::report::expansion::ExpansionState;
use crate::report::normalize::normalize;

/// 运行编排器
///
/// 持有展示状态与日志，每次运行调用一次引擎。状态通过 watch 通道发布，
/// 每次状态迁移只发布一次，观察者不会看到两次运行混合的结果。
pub struct RunOrchestrator {
    engine: Arc<dyn AnalysisEngine>,
    interceptor: DiagnosticInterceptor,
    display: watch::Sender<DisplayState>,
    running: AtomicBool,
}

impl RunOrchestrator {
    /// `original` 为诊断输出的原始通道，捕获期间的输出同时写入日志
    pub fn new(engine: Arc<dyn AnalysisEngine>, original: Arc<dyn DiagnosticSink>) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        Self {
            engine,
            interceptor: DiagnosticInterceptor::new(original, LogFeed::new()),
            display,
            running: AtomicBool::new(false),
        }
    }

    pub fn log_feed(&self) -> LogFeed {
        self.interceptor.feed().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    pub fn snapshot(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 提交一次分析
    ///
    /// 表单无效或已有运行时返回错误且不改变状态；引擎失败不会返回错误，
    /// 而是记录日志并以 [`RunOutcome::Failed`] 结束，保留上一次的结果。
    pub async fn submit(&self, form: &AnalysisForm) -> Result<RunOutcome, AnalysisError> {
        form.validate()?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(AnalysisError::RunInProgress);
        }
        let _running = RunGuard { orchestrator: self };

        let config = form.to_run_config();
        let date_range = form.date_range();
        let tracker = RunTracker::start(&config.group_id);

        self.interceptor.feed().clear();
        self.display.send_modify(|state| {
            state.celebrating = false;
            state.loading = true;
            state.date_range = date_range;
            state.state = RunState::Running;
        });

        let _capture = self.interceptor.capture();
        self.interceptor.info("开始分析...");

        let outcome = match self.engine.run_analysis(&config, &self.interceptor).await {
            Ok(raw) => {
                let results = normalize(&raw);
                let expansion = ExpansionState::derive(&results.code_stats);
                let outcome = RunOutcome::Succeeded {
                    authors: results.code_stats.len(),
                    commits: results.commit_stats.len(),
                    failures: results.failure_stats.len(),
                };

                self.display.send_modify(|state| {
                    state.results = results;
                    state.expansion = expansion;
                    state.loading = false;
                    state.celebrating = true;
                    state.state = RunState::Succeeded;
                    state.last_outcome = Some(outcome.clone());
                });
                self.interceptor.info("分析完成！");
                outcome
            }
            Err(e) => {
                diag_error!(self.interceptor, "分析失败:", e);
                let outcome = RunOutcome::Failed { error: e.to_string() };

                self.display.send_modify(|state| {
                    state.loading = false;
                    state.state = RunState::Failed;
                    state.last_outcome = Some(outcome.clone());
                });
                outcome
            }
        };

        match &outcome {
            RunOutcome::Succeeded { authors, .. } => tracker.complete(true, *authors),
            RunOutcome::Failed { .. } => tracker.complete(false, 0),
        }
        self.display.send_modify(|state| state.state = RunState::Idle);

        Ok(outcome)
    }

    /// 切换作者行的展开状态，返回切换后是否展开
    pub fn toggle_expanded(&self, key: &str) -> bool {
        let mut expanded = false;
        self.display.send_modify(|state| expanded = state.expansion.toggle(key));
        expanded
    }

    pub fn collapse_all(&self) {
        self.display.send_if_modified(|state| {
            let changed = !state.expansion.is_empty();
            state.expansion.collapse_all();
            changed
        });
    }

    pub fn clear_logs(&self) {
        self.interceptor.feed().clear();
    }

    /// 庆祝动画结束
    pub fn finish_celebration(&self) {
        self.display.send_if_modified(|state| std::mem::replace(&mut state.celebrating, false));
    }
}

/// 运行中途被取消时复位运行标志与加载状态
struct RunGuard<'a> {
    orchestrator: &'a RunOrchestrator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.display.send_if_modified(|state| {
            if state.loading || state.state == RunState::Running {
                state.loading = false;
                state.state = RunState::Idle;
                true
            } else {
                false
            }
        });
        self.orchestrator.running.store(false, Ordering::SeqCst);
    }
}
