//! Typed inputs accepted by the rule evaluators and gates. Every field an
//! evaluator reads comes from here — evaluators never parse free text.

use serde::{Deserialize, Serialize};

use shared_types::{DisclosurePhase, FeePayer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerFeeInput {
    pub has_broker_fee: bool,
    pub broker_fee_paid_by: FeePayer,
    pub broker_fee_amount: f64,
    pub monthly_rent: f64,
    #[serde(default)]
    pub income_requirement_multiplier: Option<f64>,
    #[serde(default)]
    pub credit_score_threshold: Option<u32>,
    #[serde(default)]
    pub fee_disclosed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDepositInput {
    pub security_deposit_amount: f64,
    pub monthly_rent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureInput {
    pub phase: DisclosurePhase,
    #[serde(default)]
    pub delivered_disclosures: Vec<String>,
    #[serde(default)]
    pub acknowledged_disclosures: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentIncreaseInput {
    pub region: String,
    pub current_rent: f64,
    pub proposed_rent: f64,
    pub notice_days: u32,
    #[serde(default)]
    pub eviction_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentStabilizationInput {
    pub preferential_rent: f64,
    pub legal_rent: f64,
    pub registered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdprInput {
    #[serde(default)]
    pub consent_given: bool,
    #[serde(default)]
    pub lawful_basis_present: bool,
    #[serde(default)]
    pub data_age_days: Option<u32>,
    #[serde(default)]
    pub data_subject_request_age_days: Option<u32>,
    #[serde(default)]
    pub data_subject_request_resolved: bool,
    #[serde(default)]
    pub sensitive_fields_present: Vec<String>,
    #[serde(default)]
    pub redacted_fields: Vec<String>,
}
