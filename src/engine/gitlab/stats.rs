use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{DiffInfo, RefInfo, RefType};
use crate::engine::config::RunConfig;

static MERGE_BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Merge branch '([^']+)'").expect("valid merge branch regex"));

const UNKNOWN_REF: &str = "unknown";

/// 单次提交的代码变更统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub additions: u64,
    pub deletions: u64,
    pub lines: u64,
    pub files: u64,
    /// diff 文本字节数
    pub size: u64,
}

impl DiffStats {
    pub fn add(&mut self, other: &DiffStats) {
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.lines += other.lines;
        self.files += other.files;
        self.size += other.size;
    }
}

/// 统计一次提交中需要计入的文件
pub fn diff_stats(diffs: &[DiffInfo], config: &RunConfig) -> DiffStats {
    let mut stats = DiffStats::default();

    for diff in diffs.iter().filter(|d| config.accepts_path(d.path())) {
        stats.files += 1;

        let Some(content) = diff.diff.as_deref() else {
            continue;
        };
        for line in content.lines() {
            if line.starts_with('+') && !line.starts_with("+++") {
                stats.additions += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                stats.deletions += 1;
            }
        }
        stats.size += content.len() as u64;
    }

    stats.lines = stats.additions + stats.deletions;
    stats
}

/// 提交所属的分支与标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub branch: String,
    pub tag: String,
}

impl BranchInfo {
    /// 取第一个分支和第一个标签；合并提交以提交信息中的源分支为准
    pub fn resolve(refs: &[RefInfo], message: &str) -> Self {
        let first = |kind: RefType| {
            refs.iter()
                .find(|r| r.ref_type == kind)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| UNKNOWN_REF.to_string())
        };

        let branch = merged_branch(message).unwrap_or_else(|| first(RefType::Branch));

        Self {
            branch,
            tag: first(RefType::Tag),
        }
    }
}

fn merged_branch(message: &str) -> Option<String> {
    if !message.starts_with("Merge branch") {
        return None;
    }
    MERGE_BRANCH_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{DEFAULT_IGNORED_PATHS, DEFAULT_VALID_EXTENSIONS};

    fn config() -> RunConfig {
        RunConfig {
            gitlab_api: "https://gitlab.example.com/api/v4".to_string(),
            gitlab_token: "t".to_string(),
            group_id: "1".to_string(),
            start_date: "2024-01-01 00:00:00".to_string(),
            end_date: "2024-01-07 00:00:00".to_string(),
            projects_num: 10,
            excluded_projects: Vec::new(),
            valid_extensions: DEFAULT_VALID_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            ignored_paths: DEFAULT_IGNORED_PATHS.iter().map(|s| s.to_string()).collect(),
            max_concurrent_requests: 5,
        }
    }

    fn diff(path: &str, content: &str) -> DiffInfo {
        DiffInfo {
            old_path: Some(path.to_string()),
            new_path: Some(path.to_string()),
            diff: Some(content.to_string()),
        }
    }

    #[test]
    fn test_diff_stats_counts_lines() {
        let content = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,2 +1,3 @@\n-old\n+new\n+more\n context";
        let stats = diff_stats(&[diff("src/lib.rs", content)], &config());

        assert_eq!(stats.files, 1);
        assert_eq!(stats.additions, 2);
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.size, content.len() as u64);
    }

    #[test]
    fn test_diff_stats_filters_files() {
        let diffs = vec![
            diff("node_modules/a/index.js", "+x"),
            diff("docs/README.md", "+x"),
            diff("web/app.vue", "+x\n+y"),
        ];
        let stats = diff_stats(&diffs, &config());
        assert_eq!(stats.files, 1);
        assert_eq!(stats.additions, 2);
    }

    #[test]
    fn test_branch_info_from_refs() {
        let refs: Vec<RefInfo> = serde_json::from_str(
            r#"[{"type":"tag","name":"v2"},{"type":"branch","name":"develop"},{"type":"branch","name":"main"}]"#,
        )
        .unwrap();
        let info = BranchInfo::resolve(&refs, "fix: typo");
        assert_eq!(info.branch, "develop");
        assert_eq!(info.tag, "v2");

        let info = BranchInfo::resolve(&[], "fix: typo");
        assert_eq!(info.branch, "unknown");
        assert_eq!(info.tag, "unknown");
    }

    #[test]
    fn test_merge_commit_uses_source_branch() {
        let refs: Vec<RefInfo> = serde_json::from_str(r#"[{"type":"branch","name":"main"}]"#).unwrap();
        let info = BranchInfo::resolve(&refs, "Merge branch 'feature/login' into 'main'");
        assert_eq!(info.branch, "feature/login");
    }
}
