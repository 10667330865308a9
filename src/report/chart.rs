use serde::Serialize;

use super::formatters::utils::{display_width, pad_right};
use super::model::CodeStat;

/// 代码量柱状图中的一个数据点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: String,
    /// 代码量（KB），保留两位小数
    pub value: f64,
}

/// 作者代码量图表数据，只取作者总计行
pub fn code_size_chart(tree: &[CodeStat]) -> Vec<ChartPoint> {
    let mut totals: Vec<&CodeStat> = tree.iter().filter(|row| row.is_total).collect();
    totals.sort_by(|a, b| b.size.total_cmp(&a.size));

    totals
        .into_iter()
        .map(|row| ChartPoint {
            name: row.author.replace(['【', '】'], ""),
            value: round2(row.size),
        })
        .collect()
}

/// 将图表数据渲染为文本柱状图
pub fn render_bars(points: &[ChartPoint], width: usize) -> Vec<String> {
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let name_width = points.iter().map(|p| display_width(&p.name)).max().unwrap_or(0);

    points
        .iter()
        .map(|point| {
            let bar_len = if max > 0.0 {
                ((point.value / max) * width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{} │{} {:.2} KB",
                pad_right(&point.name, name_width),
                "█".repeat(bar_len),
                point.value
            )
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
