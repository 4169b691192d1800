use serde::{Deserialize, Serialize};

/// Closed set of jurisdiction identifiers the registry knows how to resolve.
/// Unknown input normalizes to [`MarketPackId::UsStandard`] — see
/// `market_pack_id_from_market` in `compliance-engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketPackId {
    NycStrict,
    CaStandard,
    TxStandard,
    UsStandard,
    UkGdpr,
    EuGdpr,
    LatamStandard,
}

impl MarketPackId {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketPackId::NycStrict => "NYC_STRICT",
            MarketPackId::CaStandard => "CA_STANDARD",
            MarketPackId::TxStandard => "TX_STANDARD",
            MarketPackId::UsStandard => "US_STANDARD",
            MarketPackId::UkGdpr => "UK_GDPR",
            MarketPackId::EuGdpr => "EU_GDPR",
            MarketPackId::LatamStandard => "LATAM_STANDARD",
        }
    }
}

impl std::fmt::Display for MarketPackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SemVer triple used for market-pack versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PackVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for PackVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Who pays a broker fee under a given pack's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePayer {
    Tenant,
    Landlord,
    Either,
    Prohibited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerFeeRules {
    pub enabled: bool,
    pub paid_by: FeePayer,
    pub max_multiplier: f64,
    #[serde(default)]
    pub exemptions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDepositRules {
    pub enabled: bool,
    pub max_months: f64,
    pub interest_required: bool,
    pub separate_account_required: bool,
    pub return_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentIncreaseRules {
    pub enabled: bool,
    pub cpi_plus_percentage: f64,
    pub max_percentage: f64,
    pub notice_required: bool,
    pub notice_days: u32,
    pub good_cause_required: bool,
}

/// Phase of the rental lifecycle a disclosure must be delivered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosurePhase {
    ListingPublish,
    Application,
    LeaseSigning,
    MoveIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureRequirement {
    #[serde(rename = "type")]
    pub disclosure_type: String,
    pub required_before: DisclosurePhase,
    pub signature_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareActRules {
    pub enabled: bool,
    pub max_income_multiplier: f64,
    pub max_credit_score_threshold: u32,
    pub fee_disclosure_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FchaWorkflowRules {
    #[serde(default = "default_mitigating_factors_response_days")]
    pub mitigating_factors_response_days: u32,
}

fn default_mitigating_factors_response_days() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FchaRules {
    pub enabled: bool,
    #[serde(default)]
    pub workflow: FchaWorkflowRules,
}

impl Default for FchaWorkflowRules {
    fn default() -> Self {
        Self {
            mitigating_factors_response_days: default_mitigating_factors_response_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodCauseRules {
    pub enabled: bool,
    pub max_rent_increase_over_cpi: f64,
    #[serde(default)]
    pub valid_eviction_reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentStabilizationRules {
    pub enabled: bool,
    pub registration_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdprRules {
    pub enabled: bool,
    pub retention_days: u32,
    pub data_subject_request_days: u32,
    #[serde(default)]
    pub sensitive_fields: Vec<String>,
}

/// The rule sub-records carried by a [`MarketPack`]. Every pack must declare
/// `broker_fee`, `security_deposit`, `rent_increase`, and `disclosures`; the
/// rest are optional per-jurisdiction add-ons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRules {
    pub broker_fee: BrokerFeeRules,
    pub security_deposit: SecurityDepositRules,
    pub rent_increase: RentIncreaseRules,
    pub disclosures: Vec<DisclosureRequirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fare_act: Option<FareActRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcha: Option<FchaRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub good_cause: Option<GoodCauseRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_stabilization: Option<RentStabilizationRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<GdprRules>,
    /// Jurisdiction-specific blocks that don't warrant a dedicated struct yet
    /// (AB 1482 addenda, Texas Property Code carve-outs, ...). Open mapping
    /// by design — see the Market Pack data-model note.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A versioned, immutable bundle of jurisdictional rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPack {
    pub id: MarketPackId,
    pub name: String,
    pub version: PackVersion,
    pub effective_date: chrono::NaiveDate,
    pub jurisdiction: String,
    pub rules: MarketRules,
    #[serde(rename = "_mergedFromDb", default)]
    pub merged_from_db: bool,
}
