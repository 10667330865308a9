//! 分析引擎返回的数据结构

use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// 代码统计行：作者总计行或作者在某个项目下的明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeStat {
    pub key: String,
    pub author: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub project: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub lines: u64,
    pub files: u64,
    /// 代码量（KB）
    pub size: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_total: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CodeStat>>,
}

impl CodeStat {
    /// 是否拥有至少一个明细行
    pub fn has_children(&self) -> bool {
        self.children.as_ref().map_or(false, |c| !c.is_empty())
    }

    pub fn child_rows(&self) -> &[CodeStat] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// 单次提交记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStat {
    pub author: String,
    pub email: String,
    pub project: String,
    pub branch: String,
    pub tag: String,
    pub committed_date: String,
    pub message: String,
}

impl CommitStat {
    /// 表格行标识：邮箱、项目与提交时间的组合
    pub fn display_key(&self) -> String {
        format!("{}_{}_{}", self.email, self.project, self.committed_date)
    }
}

/// 请求失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureStat {
    pub url: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub operation: String,
    pub error: String,
}

impl FailureStat {
    pub fn display_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.project_name.as_deref().unwrap_or_default(),
            self.author.as_deref().unwrap_or_default(),
            self.url
        )
    }
}

/// 分析引擎返回的原始结果，三个集合都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_stats: Option<Vec<CodeStat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_stats: Option<Vec<CommitStat>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_stats: Option<Vec<FailureStat>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_engine_payload() {
        let payload = r#"{
            "codeStats": [{
                "key": "alice-total", "author": "【alice】", "email": "a@x.io",
                "project": "【总计】", "commits": 3, "additions": 10, "deletions": 2,
                "lines": 12, "files": 4, "size": 1.5, "isTotal": true,
                "children": [{
                    "key": "alice-web", "author": "alice", "email": "a@x.io",
                    "project": "web", "commits": 3, "additions": 10, "deletions": 2,
                    "lines": 12, "files": 4, "size": 1.5
                }]
            }],
            "commitStats": []
        }"#;

        let report: RawReport = serde_json::from_str(payload).unwrap();
        let code = report.code_stats.unwrap();
        assert!(code[0].is_total);
        assert!(code[0].has_children());
        assert!(!code[0].child_rows()[0].is_total);
        assert_eq!(report.commit_stats, Some(Vec::new()));
        assert!(report.failure_stats.is_none());
    }

    #[test]
    fn test_missing_size_is_rejected() {
        let payload = r#"{"codeStats": [{"key": "k", "author": "a", "commits": 1,
            "additions": 0, "deletions": 0, "lines": 0, "files": 0}]}"#;
        assert!(serde_json::from_str::<RawReport>(payload).is_err());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let row = CodeStat {
            key: "bob-api".to_string(),
            author: "bob".to_string(),
            email: String::new(),
            project: "api".to_string(),
            commits: 1,
            additions: 1,
            deletions: 0,
            lines: 1,
            files: 1,
            size: 0.25,
            is_total: false,
            children: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("isTotal").is_none());
        assert!(json.get("children").is_none());

        let commit = CommitStat {
            author: "bob".to_string(),
            email: "b@x.io".to_string(),
            project: "api".to_string(),
            branch: "main".to_string(),
            tag: "unknown".to_string(),
            committed_date: "2024-05-01T10:00:00+08:00".to_string(),
            message: "fix".to_string(),
        };
        let json = serde_json::to_value(&commit).unwrap();
        assert_eq!(json["committedDate"], "2024-05-01T10:00:00+08:00");
        assert_eq!(commit.display_key(), "b@x.io_api_2024-05-01T10:00:00+08:00");
    }

    #[test]
    fn test_empty_children_are_not_children() {
        let payload = r#"{"key": "c-total", "author": "c", "commits": 0, "additions": 0,
            "deletions": 0, "lines": 0, "files": 0, "size": 0, "isTotal": true, "children": []}"#;
        let row: CodeStat = serde_json::from_str(payload).unwrap();
        assert!(!row.has_children());
        assert!(row.child_rows().is_empty());
    }

    #[test]
    fn test_failure_display_key() {
        let failure = FailureStat {
            url: "v4/projects/1/repository/commits".to_string(),
            project_name: Some("web".to_string()),
            author: None,
            operation: "获取提交记录".to_string(),
            error: "HTTP error! status: 500".to_string(),
        };
        assert_eq!(failure.display_key(), "web__v4/projects/1/repository/commits");
    }
}
