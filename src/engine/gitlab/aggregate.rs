//! 按作者汇总提交统计并生成报告

use std::collections::BTreeMap;

use super::models::Commit;
use super::stats::{BranchInfo, DiffStats};
use crate::report::model::{CodeStat, CommitStat, FailureStat, RawReport};

#[derive(Debug, Default)]
struct ProjectTotals {
    commits: u64,
    stats: DiffStats,
}

impl ProjectTotals {
    fn record(&mut self, stats: &DiffStats) {
        self.commits += 1;
        self.stats.add(stats);
    }
}

#[derive(Debug)]
struct AuthorTotals {
    email: String,
    projects: BTreeMap<String, ProjectTotals>,
    total: ProjectTotals,
    commits: Vec<CommitStat>,
}

/// 作者维度的汇总器，作者与项目按名称排序以保证输出稳定
#[derive(Debug, Default)]
pub struct AuthorAggregator {
    authors: BTreeMap<String, AuthorTotals>,
}

impl AuthorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, project: &str, commit: &Commit, stats: &DiffStats, refs: BranchInfo) {
        let author = self
            .authors
            .entry(commit.author_name.clone())
            .or_insert_with(|| AuthorTotals {
                email: commit.author_email.clone(),
                projects: BTreeMap::new(),
                total: ProjectTotals::default(),
                commits: Vec::new(),
            });

        author.projects.entry(project.to_string()).or_default().record(stats);
        author.total.record(stats);
        author.commits.push(CommitStat {
            author: commit.author_name.clone(),
            email: author.email.clone(),
            project: project.to_string(),
            branch: refs.branch,
            tag: refs.tag,
            committed_date: commit.committed_date.clone(),
            message: commit.message.clone(),
        });
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    /// 生成报告：每个作者一行总计，项目明细作为子行
    pub fn into_report(self, failures: Vec<FailureStat>) -> RawReport {
        let mut code_stats = Vec::with_capacity(self.authors.len());
        let mut commit_stats = Vec::new();

        for (name, author) in self.authors {
            let mut children: Vec<CodeStat> = author
                .projects
                .iter()
                .map(|(project, totals)| CodeStat {
                    key: format!("{}-{}", name, project),
                    author: name.clone(),
                    email: author.email.clone(),
                    project: project.clone(),
                    ..code_stat_counters(totals)
                })
                .collect();
            children.sort_by(|a, b| b.size.total_cmp(&a.size));

            code_stats.push(CodeStat {
                key: format!("{}-total", name),
                author: format!("【{}】", name),
                email: author.email.clone(),
                project: "【总计】".to_string(),
                is_total: true,
                children: Some(children),
                ..code_stat_counters(&author.total)
            });

            commit_stats.extend(author.commits);
        }

        code_stats.sort_by(|a, b| b.size.total_cmp(&a.size));

        RawReport {
            code_stats: Some(code_stats),
            commit_stats: Some(commit_stats),
            failure_stats: (!failures.is_empty()).then_some(failures),
        }
    }
}

fn code_stat_counters(totals: &ProjectTotals) -> CodeStat {
    CodeStat {
        key: String::new(),
        author: String::new(),
        email: String::new(),
        project: String::new(),
        commits: totals.commits,
        additions: totals.stats.additions,
        deletions: totals.stats.deletions,
        lines: totals.stats.lines,
        files: totals.stats.files,
        size: bytes_to_kb(totals.stats.size),
        is_total: false,
        children: None,
    }
}

/// 字节转 KB，保留两位小数
pub fn bytes_to_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(author: &str, date: &str) -> Commit {
        Commit {
            id: format!("{}-{}", author, date),
            author_name: author.to_string(),
            author_email: format!("{}@example.com", author),
            message: "feat: change".to_string(),
            committed_date: date.to_string(),
        }
    }

    fn stats(size: u64) -> DiffStats {
        DiffStats {
            additions: 3,
            deletions: 1,
            lines: 4,
            files: 1,
            size,
        }
    }

    fn refs() -> BranchInfo {
        BranchInfo {
            branch: "main".to_string(),
            tag: "unknown".to_string(),
        }
    }

    #[test]
    fn test_bytes_to_kb() {
        assert_eq!(bytes_to_kb(0), 0.0);
        assert_eq!(bytes_to_kb(1024), 1.0);
        assert_eq!(bytes_to_kb(1536), 1.5);
        assert_eq!(bytes_to_kb(1000), 0.98);
    }

    #[test]
    fn test_report_shape() {
        let mut agg = AuthorAggregator::new();
        agg.record("web", &commit("alice", "2024-01-02T10:00:00Z"), &stats(1024), refs());
        agg.record("api", &commit("alice", "2024-01-03T10:00:00Z"), &stats(4096), refs());
        agg.record("web", &commit("bob", "2024-01-04T10:00:00Z"), &stats(10240), refs());
        assert_eq!(agg.author_count(), 2);

        let report = agg.into_report(Vec::new());
        let code = report.code_stats.unwrap();

        assert_eq!(code.len(), 2);
        assert_eq!(code[0].key, "bob-total");
        assert_eq!(code[0].author, "【bob】");
        assert_eq!(code[0].project, "【总计】");
        assert!(code[0].is_total);

        let alice = &code[1];
        assert_eq!(alice.commits, 2);
        assert_eq!(alice.additions, 6);
        assert_eq!(alice.size, 5.0);
        let children = alice.children.as_ref().unwrap();
        assert_eq!(children[0].key, "alice-api");
        assert_eq!(children[0].author, "alice");
        assert_eq!(children[1].key, "alice-web");
        assert!(!children[0].is_total);

        assert_eq!(report.commit_stats.unwrap().len(), 3);
        assert!(report.failure_stats.is_none());
    }

    #[test]
    fn test_failures_kept_when_present() {
        let failure = FailureStat {
            url: "v4/projects/1/repository/commits".to_string(),
            project_name: Some("web".to_string()),
            author: None,
            operation: "获取提交记录".to_string(),
            error: "HTTP error! status: 500 Internal Server Error".to_string(),
        };
        let report = AuthorAggregator::new().into_report(vec![failure]);
        assert_eq!(report.failure_stats.unwrap().len(), 1);
        assert!(report.code_stats.unwrap().is_empty());
    }
}
