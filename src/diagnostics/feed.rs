use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
        }
    }
}

/// 执行日志中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    pub severity: Severity,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl LogLine {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.tag(), self.text)
    }
}

/// 只追加的执行日志
///
/// 克隆后共享同一份日志。每次变更都会通过 watch 通道发布当前行数。
#[derive(Clone)]
pub struct LogFeed {
    lines: Arc<Mutex<Vec<LogLine>>>,
    changes: Arc<watch::Sender<usize>>,
    /// 清空次数
    epoch: Arc<AtomicU64>,
}

impl LogFeed {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            changes: Arc::new(changes),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn append(&self, severity: Severity, text: impl Into<String>) {
        let len = {
            let mut lines = self.lock();
            lines.push(LogLine::new(severity, text));
            lines.len()
        };
        self.changes.send_replace(len);
    }

    /// 整体清空日志
    pub fn clear(&self) {
        {
            let mut lines = self.lock();
            lines.clear();
            self.epoch.fetch_add(1, Ordering::SeqCst);
        }
        self.changes.send_replace(0);
    }

    /// 每次清空后递增，用于判断已读位置是否失效
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lock().clone()
    }

    /// 获取 `start` 之后的日志行
    pub fn lines_from(&self, start: usize) -> Vec<LogLine> {
        let lines = self.lock();
        lines.get(start..).map(|tail| tail.to_vec()).unwrap_or_default()
    }

    /// 读取上次位置之后新增的日志；日志被清空过时从头读取
    pub fn read_since(&self, cursor: FeedCursor) -> (Vec<LogLine>, FeedCursor) {
        let lines = self.lock();
        let epoch = self.epoch.load(Ordering::SeqCst);
        let start = if cursor.epoch == epoch {
            cursor.offset.min(lines.len())
        } else {
            0
        };

        let next = FeedCursor {
            epoch,
            offset: lines.len(),
        };
        (lines[start..].to_vec(), next)
    }

    /// 渲染后的日志文本，每行形如 `[INFO] ...`
    pub fn rendered(&self) -> Vec<String> {
        self.lock().iter().map(|line| line.to_string()).collect()
    }

    /// 订阅日志变更，值为变更后的行数
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.changes.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogLine>> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 日志读取位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedCursor {
    epoch: u64,
    offset: usize,
}

impl FeedCursor {
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 回退 `unread` 行，使这些行在下次读取时再次返回
    pub fn rewind(self, unread: usize) -> Self {
        Self {
            offset: self.offset.saturating_sub(unread),
            ..self
        }
    }
}

impl Default for LogFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFeed").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_render() {
        assert_eq!(LogLine::new(Severity::Info, "开始分析...").to_string(), "[INFO] 开始分析...");
        assert_eq!(LogLine::new(Severity::Error, "分析失败: boom").to_string(), "[ERROR] 分析失败: boom");
        assert!(LogLine::new(Severity::Error, "x").is_error());
    }

    #[test]
    fn test_feed_append_and_clear() {
        let feed = LogFeed::new();
        assert!(feed.is_empty());

        feed.append(Severity::Info, "a");
        feed.append(Severity::Error, "b");
        assert_eq!(feed.rendered(), vec!["[INFO] a", "[ERROR] b"]);

        // 克隆共享同一份日志
        let other = feed.clone();
        other.append(Severity::Info, "c");
        assert_eq!(feed.len(), 3);

        feed.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_lines_from() {
        let feed = LogFeed::new();
        for i in 0..5 {
            feed.append(Severity::Info, i.to_string());
        }
        let tail: Vec<String> = feed.lines_from(3).into_iter().map(|l| l.text).collect();
        assert_eq!(tail, vec!["3", "4"]);
        assert!(feed.lines_from(10).is_empty());
    }

    #[test]
    fn test_read_since_resets_after_clear() {
        let feed = LogFeed::new();
        feed.append(Severity::Info, "a");
        feed.append(Severity::Info, "b");

        let (lines, cursor) = feed.read_since(FeedCursor::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(cursor.offset(), 2);

        feed.append(Severity::Info, "c");
        let (lines, cursor) = feed.read_since(cursor);
        assert_eq!(lines[0].text, "c");

        // 清空后重新写入的行数超过已读位置，也要从头读取
        feed.clear();
        for text in ["x", "y", "z", "w"] {
            feed.append(Severity::Info, text);
        }
        let (lines, cursor) = feed.read_since(cursor);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].text, "x");
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn test_rewound_cursor_rereads_tail() {
        let feed = LogFeed::new();
        for text in ["a", "b", "c"] {
            feed.append(Severity::Info, text);
        }

        let (_, cursor) = feed.read_since(FeedCursor::default());
        let (lines, cursor) = feed.read_since(cursor.rewind(2));
        let texts: Vec<String> = lines.into_iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn test_subscribe_reports_length() {
        let feed = LogFeed::new();
        let mut rx = feed.subscribe();
        assert_eq!(*rx.borrow_and_update(), 0);

        feed.append(Severity::Info, "x");
        feed.append(Severity::Info, "y");
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);

        feed.clear();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 0);
    }
}
