use serde::{Deserialize, Serialize};

use crate::market_pack::MarketPackId;
use crate::violation::{RecommendedFix, Violation};

/// The output of every gate: an ordered, never-deduplicated list of
/// violations and fixes, plus enough provenance to reconstruct which pack and
/// policy version produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceDecision {
    pub passed: bool,
    pub violations: Vec<Violation>,
    pub fixes: Vec<RecommendedFix>,
    pub policy_version: String,
    pub market_pack: MarketPackId,
    pub market_pack_version: String,
    pub checked_at: chrono::DateTime<chrono::Utc>,
    pub checks_performed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ComplianceDecision {
    /// `passed` is derived, never set independently: a decision with a
    /// critical violation is never `passed = true`.
    pub fn passed_for(violations: &[Violation]) -> bool {
        !violations.iter().any(|v| v.severity.blocks())
    }
}

/// The atomic result handed back to the caller of a gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub allowed: bool,
    pub decision: ComplianceDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_check_id: Option<String>,
}
