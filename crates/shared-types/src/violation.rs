use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// Closed enumeration of every violation the engine can emit.
///
/// Additive-only across minor versions: adding a variant is a compatible
/// change, renaming or removing one is not (see the wire-format contract in
/// the external interfaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    // FARE Act (NYC broker-fee allocation)
    FareBrokerFeeProhibited,
    FareIncomeRequirementExcessive,
    FareCreditScoreThresholdExcessive,
    FareFeeDisclosureMissing,

    // Broker fee (general)
    BrokerFeePaidByTenantProhibited,
    BrokerFeeExcessive,

    // Security deposit
    SecurityDepositExcessive,

    // Disclosures
    DisclosureNotDelivered,
    DisclosureNotAcknowledged,

    // Good cause rent increase
    GoodCauseRentIncreaseExcessive,
    GoodCauseNoticePeriodInsufficient,
    GoodCauseEvictionInvalidReason,
    GoodCauseCpiFallbackUsed,

    // Rent stabilization
    RentStabPreferentialExceedsLegal,
    RentStabRegistrationMissing,

    // GDPR
    GdprConsentMissing,
    GdprLawfulBasisMissing,
    GdprDataRetentionExceeded,
    GdprDataSubjectRequestOverdue,
    GdprRedactionRequired,

    // Fair Chance Housing Act workflow
    FchaInvalidStateTransition,
    FchaPrequalificationIncomplete,
    FchaNoticeNotIssued,
    FchaIndividualizedAssessmentRequired,
    FchaBackgroundCheckNotAllowed,
    FchaCriminalCheckBeforeOffer,
    FchaConditionalOfferRequired,
    FchaFinalDecisionRationaleMissing,
    FchaUnknownCheckType,

    // Cross-cutting / telemetry
    MarketUnmapped,
}

impl ViolationCode {
    /// Stable machine-readable rule reference, e.g. for grouping dashboards.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::FareBrokerFeeProhibited => "FARE_BROKER_FEE_PROHIBITED",
            ViolationCode::FareIncomeRequirementExcessive => "FARE_INCOME_REQUIREMENT_EXCESSIVE",
            ViolationCode::FareCreditScoreThresholdExcessive => {
                "FARE_CREDIT_SCORE_THRESHOLD_EXCESSIVE"
            }
            ViolationCode::FareFeeDisclosureMissing => "FARE_FEE_DISCLOSURE_MISSING",
            ViolationCode::BrokerFeePaidByTenantProhibited => {
                "BROKER_FEE_PAID_BY_TENANT_PROHIBITED"
            }
            ViolationCode::BrokerFeeExcessive => "BROKER_FEE_EXCESSIVE",
            ViolationCode::SecurityDepositExcessive => "SECURITY_DEPOSIT_EXCESSIVE",
            ViolationCode::DisclosureNotDelivered => "DISCLOSURE_NOT_DELIVERED",
            ViolationCode::DisclosureNotAcknowledged => "DISCLOSURE_NOT_ACKNOWLEDGED",
            ViolationCode::GoodCauseRentIncreaseExcessive => "GOOD_CAUSE_RENT_INCREASE_EXCESSIVE",
            ViolationCode::GoodCauseNoticePeriodInsufficient => {
                "GOOD_CAUSE_NOTICE_PERIOD_INSUFFICIENT"
            }
            ViolationCode::GoodCauseEvictionInvalidReason => "GOOD_CAUSE_EVICTION_INVALID_REASON",
            ViolationCode::GoodCauseCpiFallbackUsed => "GOOD_CAUSE_CPI_FALLBACK_USED",
            ViolationCode::RentStabPreferentialExceedsLegal => {
                "RENT_STAB_PREFERENTIAL_EXCEEDS_LEGAL"
            }
            ViolationCode::RentStabRegistrationMissing => "RENT_STAB_REGISTRATION_MISSING",
            ViolationCode::GdprConsentMissing => "GDPR_CONSENT_MISSING",
            ViolationCode::GdprLawfulBasisMissing => "GDPR_LAWFUL_BASIS_MISSING",
            ViolationCode::GdprDataRetentionExceeded => "GDPR_DATA_RETENTION_EXCEEDED",
            ViolationCode::GdprDataSubjectRequestOverdue => "GDPR_DATA_SUBJECT_REQUEST_OVERDUE",
            ViolationCode::GdprRedactionRequired => "GDPR_REDACTION_REQUIRED",
            ViolationCode::FchaInvalidStateTransition => "FCHA_INVALID_STATE_TRANSITION",
            ViolationCode::FchaPrequalificationIncomplete => "FCHA_PREQUALIFICATION_INCOMPLETE",
            ViolationCode::FchaNoticeNotIssued => "FCHA_NOTICE_NOT_ISSUED",
            ViolationCode::FchaIndividualizedAssessmentRequired => {
                "FCHA_INDIVIDUALIZED_ASSESSMENT_REQUIRED"
            }
            ViolationCode::FchaBackgroundCheckNotAllowed => "FCHA_BACKGROUND_CHECK_NOT_ALLOWED",
            ViolationCode::FchaCriminalCheckBeforeOffer => "FCHA_CRIMINAL_CHECK_BEFORE_OFFER",
            ViolationCode::FchaConditionalOfferRequired => "FCHA_CONDITIONAL_OFFER_REQUIRED",
            ViolationCode::FchaFinalDecisionRationaleMissing => {
                "FCHA_FINAL_DECISION_RATIONALE_MISSING"
            }
            ViolationCode::FchaUnknownCheckType => "FCHA_UNKNOWN_CHECK_TYPE",
            ViolationCode::MarketUnmapped => "MARKET_UNMAPPED",
        }
    }
}

impl std::fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule-evaluator finding. `evidence` is audit-only: never render it
/// directly to an end user, it may carry raw field values the evaluator
/// compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub code: ViolationCode,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

impl Violation {
    pub fn new(code: ViolationCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            evidence: None,
            rule_reference: None,
            documentation_url: None,
        }
    }

    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn with_rule_reference(mut self, rule_reference: impl Into<String>) -> Self {
        self.rule_reference = Some(rule_reference.into());
        self
    }

    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }
}

/// Priority at which a [`RecommendedFix`] should be surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// A single suggested remediation action tied to one or more violations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFix {
    pub action: String,
    pub description: String,
    pub auto_fix_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fix_action: Option<String>,
    pub priority: FixPriority,
}

impl RecommendedFix {
    pub fn new(
        action: impl Into<String>,
        description: impl Into<String>,
        priority: FixPriority,
    ) -> Self {
        Self {
            action: action.into(),
            description: description.into(),
            auto_fix_available: false,
            auto_fix_action: None,
            priority,
        }
    }

    pub fn with_auto_fix(mut self, auto_fix_action: impl Into<String>) -> Self {
        self.auto_fix_available = true;
        self.auto_fix_action = Some(auto_fix_action.into());
        self
    }
}

/// Entities a gate decision, audit entry, or compliance check can be attached
/// to. Kept separate from any persistence-layer identifier type: the engine
/// never owns these rows, only references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Listing,
    Application,
    Lease,
    BrokerFeeRecord,
    SecurityDeposit,
    RentChange,
    DataSubject,
}
