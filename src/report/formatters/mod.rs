pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

use anyhow::Result;

use crate::orchestrator::label::DateRangeLabel;
use crate::report::commits::CommitTable;
use crate::report::expansion::ExpansionState;
use crate::report::normalize::NormalizedReport;

/// 渲染一次面板所需的全部状态
#[derive(Clone, Copy)]
pub struct DashboardView<'a> {
    pub report: &'a NormalizedReport,
    pub expansion: &'a ExpansionState,
    pub date_range: &'a DateRangeLabel,
    /// 只展示该作者的提交
    pub author_filter: Option<&'a str>,
    /// 提交表只展示第一页；`None` 表示全部展示
    pub commit_page_size: Option<usize>,
}

impl<'a> DashboardView<'a> {
    pub fn new(
        report: &'a NormalizedReport,
        expansion: &'a ExpansionState,
        date_range: &'a DateRangeLabel,
    ) -> Self {
        Self {
            report,
            expansion,
            date_range,
            author_filter: None,
            commit_page_size: None,
        }
    }

    pub fn with_author_filter(mut self, author: Option<&'a str>) -> Self {
        self.author_filter = author;
        self
    }

    pub fn with_commit_page_size(mut self, page_size: Option<usize>) -> Self {
        self.commit_page_size = page_size;
        self
    }

    pub fn commit_table(&self) -> CommitTable<'a> {
        let table = CommitTable::new(&self.report.commit_stats, self.author_filter);
        match self.commit_page_size {
            Some(size) => table.with_page_size(size),
            None => table,
        }
    }
}

/// 报告格式化器 trait
pub trait ReportFormatter: Send + Sync {
    /// 格式化报告
    fn format(&self, view: &DashboardView<'_>) -> Result<String>;

    /// 获取格式化器名称
    fn name(&self) -> &str;

    /// 获取支持的文件扩展名
    fn file_extension(&self) -> &str;
}

/// 代码统计表列名
pub const CODE_COLUMNS: [&str; 9] = [
    "作者", "邮箱", "项目", "提交次数", "增加行数", "删除行数", "变更行数", "文件数", "代码量(KB)",
];

/// 提交统计表列名
pub const COMMIT_COLUMNS: [&str; 7] = ["作者", "邮箱", "项目", "分支名", "标签", "提交时间", "提交信息"];

/// 错误统计表列名
pub const FAILURE_COLUMNS: [&str; 5] = ["项目", "作者", "操作", "URL", "错误信息"];

/// 格式化辅助函数
pub mod utils {
    /// 千分位格式化
    pub fn format_count(value: u64) -> String {
        let digits = value.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    pub fn format_size(size: f64) -> String {
        format!("{:.2}", size)
    }

    /// 终端显示宽度，非 ASCII 字符按双宽计算，ANSI 转义序列不占宽度
    pub fn display_width(text: &str) -> usize {
        let mut width = 0;
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // 跳过 `ESC [ ... <字母>`
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                width += if c.is_ascii() { 1 } else { 2 };
            }
        }
        width
    }

    pub fn pad_right(text: &str, width: usize) -> String {
        let padding = width.saturating_sub(display_width(text));
        format!("{}{}", text, " ".repeat(padding))
    }

    /// 多行文本压成一行
    pub fn single_line(text: &str) -> String {
        text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
    }

    /// 按列宽对齐的纯文本表格
    pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
        let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(display_width(cell));
                }
            }
        }

        let render_row = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| pad_right(cell, *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(render_row(headers.to_vec()));
        lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
        for row in rows {
            lines.push(render_row(row.iter().map(String::as_str).collect()));
        }
        lines
    }
}
