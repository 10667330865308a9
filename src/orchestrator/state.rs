use serde::Serialize;

use super::label::DateRangeLabel;
use crate::report::expansion::ExpansionState;
use crate::report::normalize::NormalizedReport;

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// 上一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    Succeeded { authors: usize, commits: usize, failures: usize },
    Failed { error: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }
}

/// 面板展示状态，每次运行整体替换
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub results: NormalizedReport,
    pub expansion: ExpansionState,
    pub date_range: DateRangeLabel,
    pub loading: bool,
    pub celebrating: bool,
    pub state: RunState,
    pub last_outcome: Option<RunOutcome>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            results: NormalizedReport::default(),
            expansion: ExpansionState::default(),
            date_range: DateRangeLabel::default(),
            loading: false,
            celebrating: false,
            state: RunState::Idle,
            last_outcome: None,
        }
    }
}

impl DisplayState {
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }
}
