use serde::Serialize;
use std::cmp::Ordering;

use super::model::{CodeStat, CommitStat, FailureStat, RawReport};

/// 可直接展示的分析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReport {
    pub code_stats: Vec<CodeStat>,
    pub commit_stats: Vec<CommitStat>,
    pub failure_stats: Vec<FailureStat>,
}

impl NormalizedReport {
    pub fn is_empty(&self) -> bool {
        self.code_stats.is_empty() && self.commit_stats.is_empty() && self.failure_stats.is_empty()
    }
}

impl From<&RawReport> for NormalizedReport {
    fn from(raw: &RawReport) -> Self {
        normalize(raw)
    }
}

/// 整理引擎结果
///
/// 作者总计行及其明细行都按代码量降序排列；排序稳定，代码量相同保持原顺序。
/// 缺失的集合视为空。不修改输入。
pub fn normalize(raw: &RawReport) -> NormalizedReport {
    let mut code_stats: Vec<CodeStat> = raw
        .code_stats
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(sort_children)
        .collect();
    code_stats.sort_by(by_size_desc);

    NormalizedReport {
        code_stats,
        commit_stats: raw.commit_stats.clone().unwrap_or_default(),
        failure_stats: raw.failure_stats.clone().unwrap_or_default(),
    }
}

fn sort_children(row: &CodeStat) -> CodeStat {
    let mut row = row.clone();
    if let Some(children) = row.children.as_mut() {
        children.sort_by(by_size_desc);
    }
    row
}

fn by_size_desc(a: &CodeStat, b: &CodeStat) -> Ordering {
    b.size.total_cmp(&a.size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, size: f64) -> CodeStat {
        CodeStat {
            key: key.to_string(),
            author: key.to_string(),
            email: String::new(),
            project: String::new(),
            commits: 0,
            additions: 0,
            deletions: 0,
            lines: 0,
            files: 0,
            size,
            is_total: false,
            children: None,
        }
    }

    fn total(key: &str, size: f64, children: Vec<CodeStat>) -> CodeStat {
        CodeStat {
            is_total: true,
            children: Some(children),
            ..row(key, size)
        }
    }

    fn keys(rows: &[CodeStat]) -> Vec<&str> {
        rows.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_authors_sorted_by_size_desc() {
        let raw = RawReport {
            code_stats: Some(vec![
                total("a", 10.0, vec![]),
                total("b", 30.0, vec![]),
                total("c", 20.0, vec![]),
            ]),
            ..RawReport::default()
        };
        assert_eq!(keys(&normalize(&raw).code_stats), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_children_sort_is_stable() {
        let raw = RawReport {
            code_stats: Some(vec![total(
                "a",
                11.0,
                vec![row("small", 1.0), row("first", 5.0), row("second", 5.0)],
            )]),
            ..RawReport::default()
        };
        let normalized = normalize(&raw);
        assert_eq!(
            keys(normalized.code_stats[0].child_rows()),
            vec!["first", "second", "small"]
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let raw = RawReport {
            code_stats: Some(vec![total("a", 1.0, vec![row("x", 1.0), row("y", 2.0)]), total("b", 2.0, vec![])]),
            ..RawReport::default()
        };
        let before = raw.clone();
        let _ = normalize(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_normalize_twice_is_unchanged() {
        let raw = RawReport {
            code_stats: Some(vec![
                total("a", 3.0, vec![row("x", 1.0), row("y", 2.0), row("z", 2.0)]),
                total("b", 3.0, vec![]),
                total("c", 7.0, vec![row("w", 7.0)]),
            ]),
            ..RawReport::default()
        };
        let once = normalize(&raw);
        let again = normalize(&RawReport {
            code_stats: Some(once.code_stats.clone()),
            commit_stats: Some(once.commit_stats.clone()),
            failure_stats: Some(once.failure_stats.clone()),
        });
        assert_eq!(again, once);
        assert_eq!(keys(&once.code_stats), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let normalized = normalize(&RawReport::default());
        assert!(normalized.is_empty());
    }
}
