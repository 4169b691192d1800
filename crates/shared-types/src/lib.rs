//! Wire types for the rental-housing compliance engine.
//!
//! Every type here is part of the stable external contract: gates return
//! [`ComplianceDecision`]/[`GateResult`], market packs are [`MarketPack`],
//! and Fair Chance Housing transitions carry [`fcha::FchaTransitionEvidence`].
//! The violation-code enumeration is additive-only across minor versions.

pub mod audit;
pub mod decision;
pub mod error;
pub mod fcha;
pub mod market_pack;
pub mod severity;
pub mod violation;

pub use audit::{AuditAction, AuditChain, AuditEvent};
pub use decision::{ComplianceDecision, GateResult};
pub use error::{ComplianceError, ComplianceResult};
pub use fcha::{
    transition_id, ActorKind, BackgroundCheckSubRecord, CheckType, DeliveryMethod,
    IndividualizedAssessmentSubRecord, FchaState, FchaTransitionEvidence, FchaWorkflowRecord,
    NoticeRecord, PrequalificationResults, ResponseWindow, StateHistoryEntry,
};
pub use market_pack::{
    BrokerFeeRules, DisclosurePhase, DisclosureRequirement, FareActRules, FchaRules,
    FchaWorkflowRules, FeePayer, GdprRules, GoodCauseRules, MarketPack, MarketPackId, MarketRules,
    PackVersion, RentIncreaseRules, RentStabilizationRules, SecurityDepositRules,
};
pub use severity::Severity;
pub use violation::{EntityKind, FixPriority, RecommendedFix, Violation, ViolationCode};
