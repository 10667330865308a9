use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;

use super::{DashboardView, ReportFormatter};
use crate::report::chart::{code_size_chart, ChartPoint};
use crate::report::model::{CodeStat, CommitStat, FailureStat};

/// JSON 格式化器
pub struct JsonFormatter;

impl JsonFormatter {
    /// 创建新的 JSON 格式化器
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_empty_slice<T>(slice: &&[T]) -> bool {
    slice.is_empty()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDashboard<'a> {
    date_range: [&'a str; 2],
    code_stats: &'a [CodeStat],
    expanded_keys: &'a BTreeSet<String>,
    chart: Vec<ChartPoint>,
    commit_stats: Vec<&'a CommitStat>,
    commit_total: usize,
    #[serde(skip_serializing_if = "is_empty_slice")]
    failure_stats: &'a [FailureStat],
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, view: &DashboardView<'_>) -> Result<String> {
        let table = view.commit_table();
        let commit_stats = if view.commit_page_size.is_some() {
            table.page(1).to_vec()
        } else {
            table.rows().to_vec()
        };

        let dashboard = JsonDashboard {
            date_range: [view.date_range.start(), view.date_range.end()],
            code_stats: &view.report.code_stats,
            expanded_keys: view.expansion.keys(),
            chart: code_size_chart(&view.report.code_stats),
            commit_stats,
            commit_total: table.total(),
            failure_stats: &view.report.failure_stats,
        };

        Ok(serde_json::to_string_pretty(&dashboard)?)
    }

    fn name(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
