use serde::Serialize;
use std::collections::BTreeSet;

use super::model::CodeStat;

/// 代码统计表的展开状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionState {
    keys: BTreeSet<String>,
}

impl ExpansionState {
    /// 默认展开所有拥有明细行的作者
    pub fn derive(tree: &[CodeStat]) -> Self {
        Self {
            keys: derive_expanded_keys(tree),
        }
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// 切换展开状态，返回切换后是否展开
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }

    pub fn set_expanded(&mut self, key: &str, expanded: bool) {
        if expanded {
            self.keys.insert(key.to_string());
        } else {
            self.keys.remove(key);
        }
    }

    pub fn collapse_all(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// 所有 `children` 非空的行的 key
pub fn derive_expanded_keys(tree: &[CodeStat]) -> BTreeSet<String> {
    tree.iter()
        .filter(|row| row.has_children())
        .map(|row| row.key.clone())
        .collect()
}
