//! Batch options shared between the orchestrator and the CLI.

use serde::{Deserialize, Serialize};

/// Half-open range `[start, end)` of batch positions that are dispatched.
///
/// A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendInterval {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl SendInterval {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start.is_none_or(|start| position >= start)
            && self.end.is_none_or(|end| position < end)
    }
}

/// What to do when a single row or message fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the whole run at the first failure.
    #[default]
    FailFast,
    /// Record the failure and continue with the next item.
    BestEffort,
}
