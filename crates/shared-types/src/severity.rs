use serde::{Deserialize, Serialize};

/// Severity of a single compliance violation.
///
/// Ordering matters: `Critical` is the only severity that blocks a gate.
/// Everything else is reported but allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Violation,
    Critical,
}

impl Severity {
    pub fn blocks(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}
