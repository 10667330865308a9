use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 滚动请求的静默窗口
pub const SCROLL_QUIET_WINDOW: Duration = Duration::from_millis(100);

/// 可滚动的展示面
pub trait ScrollSurface: Send + Sync {
    /// 当前内容长度
    fn scroll_extent(&self) -> usize;

    fn scroll_to(&self, offset: usize);
}

/// 滚动防抖
///
/// 同一时间最多一个待执行任务。静默窗口内的重复请求会重新计时，
/// 任务触发时读取当时的内容长度并滚动到末尾。需要在 tokio 运行时内使用。
pub struct ScrollDebouncer {
    surface: Arc<dyn ScrollSurface>,
    quiet_window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ScrollDebouncer {
    pub fn new(surface: Arc<dyn ScrollSurface>) -> Self {
        Self::with_quiet_window(surface, SCROLL_QUIET_WINDOW)
    }

    pub fn with_quiet_window(surface: Arc<dyn ScrollSurface>, quiet_window: Duration) -> Self {
        Self {
            surface,
            quiet_window,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet_window
    }

    /// 安排一次滚动，取消尚未执行的上一次
    pub fn schedule(&self) {
        let surface = Arc::clone(&self.surface);
        let quiet_window = self.quiet_window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_window).await;
            surface.scroll_to(surface.scroll_extent());
        });

        if let Some(previous) = self.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }

    /// 取消待执行的任务并立即滚动
    pub fn flush(&self) {
        self.cancel();
        self.surface.scroll_to(self.surface.scroll_extent());
    }

    pub fn is_pending(&self) -> bool {
        self.lock().as_ref().map_or(false, |handle| !handle.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ScrollDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 跟随日志变更自动滚动
pub struct ScrollController {
    debouncer: Arc<ScrollDebouncer>,
    follower: JoinHandle<()>,
}

impl ScrollController {
    pub fn attach(surface: Arc<dyn ScrollSurface>, changes: watch::Receiver<usize>) -> Self {
        Self::attach_with_quiet_window(surface, changes, SCROLL_QUIET_WINDOW)
    }

    pub fn attach_with_quiet_window(
        surface: Arc<dyn ScrollSurface>,
        mut changes: watch::Receiver<usize>,
        quiet_window: Duration,
    ) -> Self {
        let debouncer = Arc::new(ScrollDebouncer::with_quiet_window(surface, quiet_window));

        let follower = {
            let debouncer = Arc::clone(&debouncer);
            tokio::spawn(async move {
                while changes.changed().await.is_ok() {
                    debouncer.schedule();
                }
            })
        };

        Self { debouncer, follower }
    }

    pub fn debouncer(&self) -> &ScrollDebouncer {
        &self.debouncer
    }

    pub fn flush(&self) {
        self.debouncer.flush();
    }
}

impl Drop for ScrollController {
    fn drop(&mut self) {
        self.follower.abort();
        self.debouncer.cancel();
    }
}
