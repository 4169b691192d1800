use serde::{Deserialize, Serialize};

/// Fair Chance Housing Act application workflow states. Terminal states
/// (`Approved`, `Denied`, `FinalDecision`) have no valid successors — see
/// `fcha::valid_successors` in `compliance-engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FchaState {
    Prequalification,
    ConditionalOffer,
    BackgroundCheckAllowed,
    IndividualizedAssessment,
    FinalDecision,
    Approved,
    Denied,
}

impl FchaState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FchaState::Prequalification => "PREQUALIFICATION",
            FchaState::ConditionalOffer => "CONDITIONAL_OFFER",
            FchaState::BackgroundCheckAllowed => "BACKGROUND_CHECK_ALLOWED",
            FchaState::IndividualizedAssessment => "INDIVIDUALIZED_ASSESSMENT",
            FchaState::FinalDecision => "FINAL_DECISION",
            FchaState::Approved => "APPROVED",
            FchaState::Denied => "DENIED",
        }
    }
}

impl std::fmt::Display for FchaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background-check request classification. Criminal checks may only be
/// requested once a conditional offer has been issued; prequalification
/// checks are always allowed regardless of state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    CriminalBackgroundCheck,
    CriminalHistory,
    ArrestRecord,
    ConvictionRecord,
    IncomeVerification,
    EmploymentVerification,
    CreditCheck,
    RentalHistory,
    EvictionHistory,
    IdentityVerification,
    Other(String),
}

impl CheckType {
    pub fn is_criminal(&self) -> bool {
        matches!(
            self,
            CheckType::CriminalBackgroundCheck
                | CheckType::CriminalHistory
                | CheckType::ArrestRecord
                | CheckType::ConvictionRecord
        )
    }

    pub fn is_prequalification(&self) -> bool {
        matches!(
            self,
            CheckType::IncomeVerification
                | CheckType::EmploymentVerification
                | CheckType::CreditCheck
                | CheckType::RentalHistory
                | CheckType::EvictionHistory
                | CheckType::IdentityVerification
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    System,
    User,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Email,
    Mail,
    InApp,
    HandDelivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeRecord {
    #[serde(rename = "type")]
    pub notice_type: String,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub delivery_method: DeliveryMethod,
    pub recipient_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseWindow {
    pub opens_at: chrono::DateTime<chrono::Utc>,
    pub closes_at: chrono::DateTime<chrono::Utc>,
    pub days_allowed: u32,
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrequalificationResults {
    pub income_verified: bool,
    pub credit_checked: bool,
    pub rental_history_checked: bool,
    pub employment_verified: bool,
}

impl PrequalificationResults {
    pub fn all_complete(&self) -> bool {
        self.income_verified
            && self.credit_checked
            && self.rental_history_checked
            && self.employment_verified
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundCheckSubRecord {
    pub authorization_signed: bool,
    #[serde(default)]
    pub adverse_info_found: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualizedAssessmentSubRecord {
    #[serde(default)]
    pub article_23a_factors_considered: Vec<String>,
}

/// One entry in a [`FchaWorkflowRecord`]'s `state_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateHistoryEntry {
    pub state: FchaState,
    pub entered_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exited_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_id: Option<String>,
}

/// Per-application workflow snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FchaWorkflowRecord {
    pub application_id: String,
    pub current_state: FchaState,
    pub state_history: Vec<StateHistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_offer_issued_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_offer_unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_check_allowed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individualized_assessment_started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_decision_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_decision_result: Option<FchaState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_response_window: Option<ResponseWindow>,
}

impl FchaWorkflowRecord {
    pub fn new(application_id: impl Into<String>, entered_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            application_id: application_id.into(),
            current_state: FchaState::Prequalification,
            state_history: vec![StateHistoryEntry {
                state: FchaState::Prequalification,
                entered_at,
                exited_at: None,
                transition_id: None,
            }],
            conditional_offer_issued_at: None,
            conditional_offer_unit_id: None,
            background_check_allowed_at: None,
            individualized_assessment_started_at: None,
            final_decision_at: None,
            final_decision_result: None,
            active_response_window: None,
        }
    }
}

/// Immutable evidence of one state transition, suitable for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FchaTransitionEvidence {
    pub application_id: String,
    pub transition_id: String,
    pub from_state: FchaState,
    pub to_state: FchaState,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub actor_id: String,
    pub actor_kind: ActorKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices_issued: Vec<NoticeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_window: Option<ResponseWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_check: Option<BackgroundCheckSubRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individualized_assessment: Option<IndividualizedAssessmentSubRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prequalification_results: Option<PrequalificationResults>,
}

/// Deterministic transition id: `fcha_<applicationId>_<digits of timestamp>`.
pub fn transition_id(application_id: &str, timestamp: chrono::DateTime<chrono::Utc>) -> String {
    let digits: String = timestamp
        .timestamp_millis()
        .to_string()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    format!("fcha_{application_id}_{digits}")
}
