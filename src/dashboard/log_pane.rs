use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use super::scroll::ScrollSurface;
use crate::diagnostics::{FeedCursor, LogFeed, LogLine};

/// 终端日志面板
///
/// 内容长度即日志行数；滚动到末尾时输出尚未输出的日志行。只读日志，不写入。
pub struct LogPane<W: Write + Send> {
    feed: LogFeed,
    use_colors: bool,
    inner: Mutex<PaneState<W>>,
}

struct PaneState<W> {
    writer: W,
    cursor: FeedCursor,
}

impl LogPane<io::Stderr> {
    pub fn stderr(feed: LogFeed, use_colors: bool) -> Self {
        Self::new(feed, io::stderr(), use_colors)
    }
}

impl<W: Write + Send> LogPane<W> {
    pub fn new(feed: LogFeed, writer: W, use_colors: bool) -> Self {
        Self {
            feed,
            use_colors,
            inner: Mutex::new(PaneState {
                writer,
                cursor: FeedCursor::default(),
            }),
        }
    }

    /// 已输出的行数
    pub fn printed(&self) -> usize {
        self.lock().cursor.offset()
    }

    fn render(&self, line: &LogLine) -> String {
        let time = line.timestamp.format("%H:%M:%S");
        if self.use_colors && line.is_error() {
            format!("\x1b[31m{} {}\x1b[0m", time, line)
        } else {
            format!("{} {}", time, line)
        }
    }

    fn lock(&self) -> MutexGuard<'_, PaneState<W>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> ScrollSurface for LogPane<W> {
    fn scroll_extent(&self) -> usize {
        self.feed.len()
    }

    fn scroll_to(&self, _offset: usize) {
        let mut state = self.lock();
        let (lines, cursor) = self.feed.read_since(state.cursor);

        // 只越过已成功输出的行，失败的行留到下次滚动
        for (written, line) in lines.iter().enumerate() {
            let rendered = self.render(line);
            if let Err(e) = writeln!(state.writer, "{}", rendered) {
                tracing::debug!(error = %e, "日志面板输出失败");
                state.cursor = cursor.rewind(lines.len() - written);
                return;
            }
        }
        state.cursor = cursor;
        if let Err(e) = state.writer.flush() {
            tracing::debug!(error = %e, "日志面板输出失败");
        }
    }
}
