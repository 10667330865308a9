use anyhow::Result;

use super::utils::{format_count, format_size, single_line};
use super::{DashboardView, ReportFormatter, CODE_COLUMNS, COMMIT_COLUMNS, FAILURE_COLUMNS};
use crate::report::chart::code_size_chart;
use crate::report::commits::format_committed_date;
use crate::report::model::CodeStat;

/// Markdown 格式化器
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// 创建新的 Markdown 格式化器
    pub fn new() -> Self {
        Self
    }

    /// 转义表格单元格
    fn cell(text: &str) -> String {
        single_line(text).replace('|', "\\|")
    }

    fn header(columns: &[&str]) -> String {
        format!(
            "| {} |\n|{}|\n",
            columns.join(" | "),
            columns.iter().map(|_| " --- ").collect::<Vec<_>>().join("|")
        )
    }

    fn row(cells: &[String]) -> String {
        format!("| {} |\n", cells.join(" | "))
    }

    fn code_row(row: &CodeStat, child: bool) -> String {
        let (author, project, size) = if row.is_total {
            (
                format!("**{}**", Self::cell(&row.author)),
                format!("**{}**", Self::cell(&row.project)),
                format!("`{}`", format_size(row.size)),
            )
        } else {
            (Self::cell(&row.author), Self::cell(&row.project), format_size(row.size))
        };
        let author = if child { format!("↳ {}", author) } else { author };

        Self::row(&[
            author,
            Self::cell(&row.email),
            project,
            format_count(row.commits),
            format_count(row.additions),
            format_count(row.deletions),
            format_count(row.lines),
            format_count(row.files),
            size,
        ])
    }

    fn generate_code_stats(&self, view: &DashboardView<'_>) -> String {
        let mut content = format!("## {}\n\n", view.date_range.code_title());

        if view.report.code_stats.is_empty() {
            content.push_str("_暂无数据_\n");
            return content;
        }

        content.push_str(&Self::header(&CODE_COLUMNS));
        for row in &view.report.code_stats {
            content.push_str(&Self::code_row(row, false));
            if view.expansion.is_expanded(&row.key) {
                for child in row.child_rows() {
                    content.push_str(&Self::code_row(child, true));
                }
            }
        }

        let chart = code_size_chart(&view.report.code_stats);
        if !chart.is_empty() {
            content.push_str("\n### 代码量分布\n\n");
            content.push_str(&Self::header(&["作者", "代码量(KB)"]));
            for point in chart {
                content.push_str(&Self::row(&[Self::cell(&point.name), format!("{:.2}", point.value)]));
            }
        }

        content
    }

    fn generate_commit_stats(&self, view: &DashboardView<'_>) -> String {
        let mut content = format!("## {}\n\n", view.date_range.commit_title());
        let table = view.commit_table();
        let shown = if view.commit_page_size.is_some() {
            table.page(1)
        } else {
            table.rows()
        };

        content.push_str(&Self::header(&COMMIT_COLUMNS));
        for commit in shown {
            content.push_str(&Self::row(&[
                Self::cell(&commit.author),
                Self::cell(&commit.email),
                Self::cell(&commit.project),
                Self::cell(&commit.branch),
                Self::cell(&commit.tag),
                format_committed_date(&commit.committed_date),
                Self::cell(&commit.message),
            ]));
        }
        content.push_str(&format!("\n{}\n", table.total_label()));

        content
    }

    fn generate_failure_stats(&self, view: &DashboardView<'_>) -> String {
        if view.report.failure_stats.is_empty() {
            return String::new();
        }

        let mut content = String::from("## 错误统计\n\n");
        content.push_str(&Self::header(&FAILURE_COLUMNS));
        for failure in &view.report.failure_stats {
            content.push_str(&Self::row(&[
                Self::cell(failure.project_name.as_deref().unwrap_or_default()),
                Self::cell(failure.author.as_deref().unwrap_or_default()),
                Self::cell(&failure.operation),
                format!("`{}`", failure.url),
                Self::cell(&failure.error),
            ]));
        }

        content
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, view: &DashboardView<'_>) -> Result<String> {
        let mut content = String::from("# GitLab 代码分析\n\n");

        content.push_str(&self.generate_code_stats(view));
        content.push('\n');
        content.push_str(&self.generate_commit_stats(view));

        let failures = self.generate_failure_stats(view);
        if !failures.is_empty() {
            content.push('\n');
            content.push_str(&failures);
        }

        Ok(content)
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}
