use anyhow::Result;

use super::utils::{format_count, format_size, render_table, single_line};
use super::{DashboardView, ReportFormatter, CODE_COLUMNS, COMMIT_COLUMNS, FAILURE_COLUMNS};
use crate::report::chart::{code_size_chart, render_bars};
use crate::report::commits::format_committed_date;
use crate::report::model::CodeStat;

const CHART_WIDTH: usize = 40;

/// 文本格式化器
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// 创建新的文本格式化器
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// 创建不使用颜色的文本格式化器
    pub fn new_no_color() -> Self {
        Self { use_colors: false }
    }

    /// 生成分隔线
    fn separator(&self, length: usize) -> String {
        "=".repeat(length)
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("\x1b[1m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    fn section_title(&self, title: &str) -> String {
        format!("{}\n{}\n{}\n", self.separator(80), self.bold(title), self.separator(80))
    }

    /// 总计行的作者、项目与代码量加粗
    fn code_row(&self, row: &CodeStat, child: bool) -> Vec<String> {
        let (author, project, size) = if row.is_total {
            (self.bold(&row.author), self.bold(&row.project), self.bold(&format_size(row.size)))
        } else {
            (row.author.clone(), row.project.clone(), format_size(row.size))
        };
        let author = if child { format!("  └ {}", author) } else { author };

        vec![
            author,
            row.email.clone(),
            project,
            format_count(row.commits),
            format_count(row.additions),
            format_count(row.deletions),
            format_count(row.lines),
            format_count(row.files),
            size,
        ]
    }

    /// 生成代码统计部分
    fn generate_code_stats(&self, view: &DashboardView<'_>) -> String {
        let mut content = self.section_title(&view.date_range.code_title());

        if view.report.code_stats.is_empty() {
            content.push_str("暂无数据\n");
            return content;
        }

        let mut rows = Vec::new();
        for row in &view.report.code_stats {
            rows.push(self.code_row(row, false));
            if view.expansion.is_expanded(&row.key) {
                for child in row.child_rows() {
                    rows.push(self.code_row(child, true));
                }
            }
        }

        for line in render_table(&CODE_COLUMNS, &rows) {
            content.push_str(&line);
            content.push('\n');
        }

        let chart = code_size_chart(&view.report.code_stats);
        if !chart.is_empty() {
            content.push('\n');
            content.push_str(&self.bold("代码量分布 (KB)"));
            content.push('\n');
            for line in render_bars(&chart, CHART_WIDTH) {
                content.push_str(&line);
                content.push('\n');
            }
        }

        content
    }

    /// 生成提交统计部分
    fn generate_commit_stats(&self, view: &DashboardView<'_>) -> String {
        let mut content = self.section_title(&view.date_range.commit_title());
        let table = view.commit_table();

        let shown = if view.commit_page_size.is_some() {
            table.page(1)
        } else {
            table.rows()
        };

        let rows: Vec<Vec<String>> = shown
            .iter()
            .map(|commit| {
                vec![
                    commit.author.clone(),
                    commit.email.clone(),
                    commit.project.clone(),
                    commit.branch.clone(),
                    commit.tag.clone(),
                    format_committed_date(&commit.committed_date),
                    single_line(&commit.message),
                ]
            })
            .collect();

        for line in render_table(&COMMIT_COLUMNS, &rows) {
            content.push_str(&line);
            content.push('\n');
        }
        content.push_str(&table.total_label());
        content.push('\n');

        content
    }

    /// 生成错误统计部分，没有失败时为空
    fn generate_failure_stats(&self, view: &DashboardView<'_>) -> String {
        if view.report.failure_stats.is_empty() {
            return String::new();
        }

        let mut content = self.section_title("错误统计");
        let rows: Vec<Vec<String>> = view
            .report
            .failure_stats
            .iter()
            .map(|failure| {
                vec![
                    failure.project_name.clone().unwrap_or_default(),
                    failure.author.clone().unwrap_or_default(),
                    failure.operation.clone(),
                    failure.url.clone(),
                    failure.error.clone(),
                ]
            })
            .collect();

        for line in render_table(&FAILURE_COLUMNS, &rows) {
            content.push_str(&line);
            content.push('\n');
        }

        content
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, view: &DashboardView<'_>) -> Result<String> {
        let mut content = String::new();

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
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}
