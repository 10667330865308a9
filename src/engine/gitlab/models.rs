//! GitLab REST API 返回的数据结构，只保留用到的字段

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub id: String,
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub message: String,
    pub committed_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiffInfo {
    #[serde(default)]
    pub old_path: Option<String>,
    #[serde(default)]
    pub new_path: Option<String>,
    #[serde(default)]
    pub diff: Option<String>,
}

impl DiffInfo {
    /// 优先使用新路径
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Branch,
    Tag,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefInfo {
    #[serde(rename = "type")]
    pub ref_type: RefType,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_refs() {
        let refs: Vec<RefInfo> = serde_json::from_str(
            r#"[{"type":"branch","name":"main"},{"type":"tag","name":"v1.0"},{"type":"note","name":"x"}]"#,
        )
        .unwrap();
        assert_eq!(refs[0].ref_type, RefType::Branch);
        assert_eq!(refs[1].ref_type, RefType::Tag);
        assert_eq!(refs[2].ref_type, RefType::Other);
    }

    #[test]
    fn test_diff_path_fallback() {
        let diff: DiffInfo =
            serde_json::from_str(r#"{"old_path":"src/old.rs","new_path":null,"diff":"+a"}"#).unwrap();
        assert_eq!(diff.path(), "src/old.rs");
    }
}
