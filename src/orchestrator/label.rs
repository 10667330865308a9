use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::engine::config::DATE_FORMAT;
use crate::infrastructure::error::AnalysisError;

/// 默认统计最近 7 天
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// 统计区间最长天数
pub const MAX_RANGE_DAYS: i64 = 3650;

/// `end` 之前 `days` 天的时刻，天数须在 1 到 [`MAX_RANGE_DAYS`] 之间
pub fn days_before(end: NaiveDateTime, days: i64) -> Result<NaiveDateTime, AnalysisError> {
    let out_of_range =
        || AnalysisError::invalid_field("default_days", format!("统计天数必须在 1 到 {} 之间", MAX_RANGE_DAYS));

    if !(1..=MAX_RANGE_DAYS).contains(&days) {
        return Err(out_of_range());
    }
    Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(out_of_range)
}

/// 表格标题中的统计区间，运行开始时冻结
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeLabel {
    start: String,
    end: String,
}

impl DateRangeLabel {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn from_range(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::new(
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string(),
        )
    }

    /// 截至当前时刻的最近 `days` 天，天数超出范围时截断
    pub fn last_days(days: i64) -> Self {
        let end = Local::now().naive_local();
        let start = days_before(end, days.clamp(1, MAX_RANGE_DAYS)).unwrap_or(end);
        Self::from_range(start, end)
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn code_title(&self) -> String {
        format!("代码统计（{} 至 {}）", self.start, self.end)
    }

    pub fn commit_title(&self) -> String {
        format!("提交统计（{} 至 {}）", self.start, self.end)
    }
}

impl Default for DateRangeLabel {
    /// 尚未运行时显示最近 7 天
    fn default() -> Self {
        Self::last_days(DEFAULT_RANGE_DAYS)
    }
}
