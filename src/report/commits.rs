use chrono::{DateTime, FixedOffset, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::model::CommitStat;

/// 提交表每页条数
pub const COMMIT_PAGE_SIZE: usize = 30;

/// 解析 GitLab 返回的提交时间
pub fn parse_committed_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// 提交时间展示为 `YYYY-MM-DD HH:mm`，无法解析时原样返回
pub fn format_committed_date(value: &str) -> String {
    if let Some(date) = parse_committed_date(value) {
        return date.format("%Y-%m-%d %H:%M").to_string();
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// 按提交时间降序，无法解析的时间排在最后
pub fn sort_by_date_desc(commits: &[CommitStat]) -> Vec<&CommitStat> {
    let mut sorted: Vec<&CommitStat> = commits.iter().collect();
    sorted.sort_by(|a, b| {
        match (parse_committed_date(&a.committed_date), parse_committed_date(&b.committed_date)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    sorted
}

/// 作者筛选项
pub fn distinct_authors(commits: &[CommitStat]) -> BTreeSet<&str> {
    commits.iter().map(|c| c.author.as_str()).collect()
}

/// 提交表视图：排序、按作者筛选与分页
pub struct CommitTable<'a> {
    rows: Vec<&'a CommitStat>,
    page_size: usize,
}

impl<'a> CommitTable<'a> {
    pub fn new(commits: &'a [CommitStat], author: Option<&str>) -> Self {
        let rows = sort_by_date_desc(commits)
            .into_iter()
            .filter(|c| author.map_or(true, |a| c.author == a))
            .collect();

        Self {
            rows,
            page_size: COMMIT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn page_count(&self) -> usize {
        (self.rows.len() + self.page_size - 1) / self.page_size
    }

    /// 获取第 `page` 页（从 1 开始）
    pub fn page(&self, page: usize) -> &[&'a CommitStat] {
        let start = page.saturating_sub(1) * self.page_size;
        if start >= self.rows.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn rows(&self) -> &[&'a CommitStat] {
        &self.rows
    }

    pub fn total_label(&self) -> String {
        format!("共 {} 条记录", self.total())
    }
}
