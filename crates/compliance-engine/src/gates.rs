//! Gate layer: the atomic allow/deny decision entry point for one external
//! action. Every gate shares the same template — resolve pack (done by the
//! caller/engine), run the relevant evaluators, compose the ordered
//! violation list, compute `passed`, and populate `checksPerformed`.

use chrono::Utc;
use shared_types::{
    CheckType, ComplianceDecision, FchaState, FchaWorkflowRecord, GateResult, MarketPack,
    RecommendedFix, Violation,
};

use crate::cpi::CpiProvider;
use crate::evaluators::{broker_fee, disclosures, fare_act, gdpr, good_cause, rent_stabilization, security_deposit};
use crate::fcha_machine::{self, TransitionOutcome, TransitionRequest};
use crate::inputs::{BrokerFeeInput, DisclosureInput, GdprInput, RentIncreaseInput, RentStabilizationInput, SecurityDepositInput};

fn blocked_reason(violations: &[Violation]) -> Option<String> {
    let messages: Vec<&str> = violations
        .iter()
        .filter(|v| v.severity.blocks())
        .map(|v| v.message.as_str())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

fn build_decision(
    pack: &MarketPack,
    policy_version: &str,
    violations: Vec<Violation>,
    fixes: Vec<RecommendedFix>,
    checks_performed: Vec<&'static str>,
    metadata: Option<serde_json::Value>,
) -> ComplianceDecision {
    let passed = ComplianceDecision::passed_for(&violations);
    ComplianceDecision {
        passed,
        violations,
        fixes,
        policy_version: policy_version.to_string(),
        market_pack: pack.id,
        market_pack_version: pack.version.to_string(),
        checked_at: Utc::now(),
        checks_performed: checks_performed.into_iter().map(str::to_string).collect(),
        metadata: metadata.and_then(|v| v.as_object().cloned()),
    }
}

fn finish(decision: ComplianceDecision) -> GateResult {
    let blocked_reason = blocked_reason(&decision.violations);
    GateResult {
        allowed: decision.passed,
        blocked_reason,
        decision,
        audit_id: None,
        compliance_check_id: None,
    }
}

pub fn listing_publish(
    pack: &MarketPack,
    policy_version: &str,
    broker_fee_input: &BrokerFeeInput,
    disclosure_input: &DisclosureInput,
) -> GateResult {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    let (v, f) = fare_act::evaluate(broker_fee_input, pack);
    violations.extend(v);
    fixes.extend(f);
    let (v, f) = broker_fee::evaluate(broker_fee_input, pack);
    violations.extend(v);
    fixes.extend(f);
    let (v, f) = disclosures::evaluate(disclosure_input, pack);
    violations.extend(v);
    fixes.extend(f);

    let metadata = serde_json::json!({
        "phase": disclosure_input.phase,
        "previousValues": {
            "brokerFeeAmount": broker_fee_input.broker_fee_amount,
            "monthlyRent": broker_fee_input.monthly_rent,
        },
    });

    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["fare_act", "broker_fee", "disclosures"],
        Some(metadata),
    ))
}

pub fn listing_update(
    pack: &MarketPack,
    policy_version: &str,
    broker_fee_input: &BrokerFeeInput,
    disclosure_input: &DisclosureInput,
) -> GateResult {
    listing_publish(pack, policy_version, broker_fee_input, disclosure_input)
}

pub fn broker_fee_change(pack: &MarketPack, policy_version: &str, input: &BrokerFeeInput) -> GateResult {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    let (v, f) = fare_act::evaluate(input, pack);
    violations.extend(v);
    fixes.extend(f);
    let (v, f) = broker_fee::evaluate(input, pack);
    violations.extend(v);
    fixes.extend(f);

    let metadata = serde_json::json!({
        "previousValues": {
            "brokerFeeAmount": input.broker_fee_amount,
            "monthlyRent": input.monthly_rent,
        },
    });

    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["fare_act", "broker_fee"],
        Some(metadata),
    ))
}

pub fn security_deposit_change(
    pack: &MarketPack,
    policy_version: &str,
    input: &SecurityDepositInput,
) -> GateResult {
    let (violations, fixes) = security_deposit::evaluate(input, pack);
    let metadata = serde_json::json!({
        "previousValues": {
            "securityDepositAmount": input.security_deposit_amount,
            "monthlyRent": input.monthly_rent,
        },
    });
    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["security_deposit"],
        Some(metadata),
    ))
}

pub async fn rent_increase(
    pack: &MarketPack,
    policy_version: &str,
    input: &RentIncreaseInput,
    rent_stabilization_input: Option<&RentStabilizationInput>,
    cpi: &dyn CpiProvider,
) -> GateResult {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();
    let mut checks = vec!["good_cause"];

    let (v, f) = good_cause::evaluate(input, pack, cpi).await;
    violations.extend(v);
    fixes.extend(f);

    let mut metadata = serde_json::json!({
        "region": input.region,
        "previousValues": {
            "currentRent": input.current_rent,
            "proposedRent": input.proposed_rent,
        },
    });

    if let Some(rs_input) = rent_stabilization_input {
        let (v, f) = rent_stabilization::evaluate(rs_input, pack);
        violations.extend(v);
        fixes.extend(f);
        checks.push("rent_stabilization");
        metadata["previousValues"]["preferentialRent"] = serde_json::json!(rs_input.preferential_rent);
        metadata["previousValues"]["legalRent"] = serde_json::json!(rs_input.legal_rent);
    }

    finish(build_decision(pack, policy_version, violations, fixes, checks, Some(metadata)))
}

/// Coarse-grained check: is `to_state` even a member of the valid-successor
/// set for the record's current state? Does not produce transition evidence
/// or an updated workflow record — use [`fcha_workflow_transition`] for that.
pub fn fcha_stage_transition(
    pack: &MarketPack,
    policy_version: &str,
    record: &FchaWorkflowRecord,
    to_state: FchaState,
) -> GateResult {
    let mut violations = Vec::new();
    if pack.rules.fcha.as_ref().is_some_and(|r| r.enabled)
        && !fcha_machine::valid_successors(record.current_state).contains(&to_state)
    {
        violations.push(Violation::new(
            shared_types::ViolationCode::FchaInvalidStateTransition,
            shared_types::Severity::Critical,
            format!("{} cannot transition to {to_state}", record.current_state),
        ));
    }
    let metadata = serde_json::json!({
        "entityId": record.application_id,
        "previousValues": { "currentState": record.current_state },
        "toState": to_state,
    });
    finish(build_decision(
        pack,
        policy_version,
        violations,
        Vec::new(),
        vec!["fcha_workflow"],
        Some(metadata),
    ))
}

pub struct FchaWorkflowTransitionResult {
    pub gate: GateResult,
    pub outcome: TransitionOutcome,
}

pub fn fcha_workflow_transition(
    pack: &MarketPack,
    policy_version: &str,
    request: TransitionRequest<'_>,
) -> FchaWorkflowTransitionResult {
    let application_id = request.application_id.to_string();
    let from_state = request.record.current_state;
    let to_state = request.to_state;

    let outcome = fcha_machine::validate_transition(request, pack.rules.fcha.as_ref());

    let metadata = serde_json::json!({
        "entityId": application_id,
        "previousValues": { "currentState": from_state },
        "toState": to_state,
        "transitionId": outcome.evidence.as_ref().map(|e| e.transition_id.clone()),
    });

    let decision = build_decision(
        pack,
        policy_version,
        outcome.violations.clone(),
        outcome.fixes.clone(),
        vec!["fcha_workflow"],
        Some(metadata),
    );
    FchaWorkflowTransitionResult {
        gate: finish(decision),
        outcome,
    }
}

pub fn fcha_background_check(
    pack: &MarketPack,
    policy_version: &str,
    current_state: FchaState,
    check_type: &CheckType,
) -> GateResult {
    let (violations, fixes) =
        fcha_machine::validate_background_check(current_state, check_type, pack.rules.fcha.as_ref());
    let metadata = serde_json::json!({
        "previousValues": { "currentState": current_state },
        "checkType": check_type,
    });
    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["fcha_background_check"],
        Some(metadata),
    ))
}

pub fn fcha_criminal_check(pack: &MarketPack, policy_version: &str, current_state: FchaState) -> GateResult {
    let (violations, fixes) = fcha_machine::validate_background_check(
        current_state,
        &CheckType::CriminalBackgroundCheck,
        pack.rules.fcha.as_ref(),
    );
    let metadata = serde_json::json!({
        "previousValues": { "currentState": current_state },
        "checkType": CheckType::CriminalBackgroundCheck,
    });
    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["fcha_criminal_check"],
        Some(metadata),
    ))
}

pub fn disclosure_requirement(pack: &MarketPack, policy_version: &str, input: &DisclosureInput) -> GateResult {
    let (violations, fixes) = disclosures::evaluate(input, pack);
    let metadata = serde_json::json!({ "phase": input.phase });
    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["disclosures"],
        Some(metadata),
    ))
}

pub fn lease_creation(
    pack: &MarketPack,
    policy_version: &str,
    broker_fee_input: &BrokerFeeInput,
    security_deposit_input: &SecurityDepositInput,
    disclosure_input: &DisclosureInput,
) -> GateResult {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    let (v, f) = broker_fee::evaluate(broker_fee_input, pack);
    violations.extend(v);
    fixes.extend(f);
    let (v, f) = security_deposit::evaluate(security_deposit_input, pack);
    violations.extend(v);
    fixes.extend(f);
    let (v, f) = disclosures::evaluate(disclosure_input, pack);
    violations.extend(v);
    fixes.extend(f);

    let metadata = serde_json::json!({
        "phase": disclosure_input.phase,
        "previousValues": {
            "brokerFeeAmount": broker_fee_input.broker_fee_amount,
            "monthlyRent": broker_fee_input.monthly_rent,
            "securityDepositAmount": security_deposit_input.security_deposit_amount,
        },
    });

    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["broker_fee", "security_deposit", "disclosures"],
        Some(metadata),
    ))
}

pub fn gdpr_data_operation(pack: &MarketPack, policy_version: &str, input: &GdprInput) -> GateResult {
    let (violations, fixes) = gdpr::evaluate(input, pack);
    let metadata = serde_json::json!({
        "previousValues": {
            "dataAgeDays": input.data_age_days,
            "dataSubjectRequestAgeDays": input.data_subject_request_age_days,
        },
    });
    finish(build_decision(
        pack,
        policy_version,
        violations,
        fixes,
        vec!["gdpr_consent", "gdpr_retention"],
        Some(metadata),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::FallbackCpiProvider;
    use crate::registry;
    use shared_types::{ActorKind, DisclosurePhase, FeePayer, MarketPackId};

    fn nyc() -> MarketPack {
        registry::get_market_pack(MarketPackId::NycStrict).unwrap()
    }

    fn tx() -> MarketPack {
        registry::get_market_pack(MarketPackId::TxStandard).unwrap()
    }

    #[test]
    fn nyc_tenant_paid_broker_fee_blocked() {
        let broker_fee_input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Tenant,
            broker_fee_amount: 3000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let disclosure_input = DisclosureInput {
            phase: DisclosurePhase::Application,
            delivered_disclosures: vec!["fare_act_disclosure".to_string()],
            acknowledged_disclosures: vec![],
        };
        let result = listing_publish(&nyc(), "1.0.0", &broker_fee_input, &disclosure_input);
        assert!(!result.allowed);
        assert_eq!(result.decision.market_pack, MarketPackId::NycStrict);
        assert!(result.blocked_reason.unwrap().contains("FARE Act"));
        let metadata = result.decision.metadata.expect("metadata attached");
        assert_eq!(
            metadata["previousValues"]["brokerFeeAmount"],
            serde_json::json!(3000.0)
        );
    }

    #[test]
    fn texas_identical_broker_fee_allowed() {
        let broker_fee_input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Tenant,
            broker_fee_amount: 3000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let disclosure_input = DisclosureInput {
            phase: DisclosurePhase::Application,
            delivered_disclosures: vec!["lead_paint_disclosure".to_string()],
            acknowledged_disclosures: vec!["lead_paint_disclosure".to_string()],
        };
        let result = listing_publish(&tx(), "1.0.0", &broker_fee_input, &disclosure_input);
        assert!(result.allowed);
        assert_eq!(result.decision.market_pack, MarketPackId::TxStandard);
    }

    #[tokio::test]
    async fn nyc_rent_increase_25_percent_blocked() {
        let input = RentIncreaseInput {
            region: "NYC_STRICT".to_string(),
            current_rent: 2000.0,
            proposed_rent: 2500.0,
            notice_days: 30,
            eviction_reason: None,
        };
        let cpi = FallbackCpiProvider::new();
        let result = rent_increase(&nyc(), "1.0.0", &input, None, &cpi).await;
        assert!(!result.allowed);
        assert!(result
            .decision
            .violations
            .iter()
            .any(|v| v.code == shared_types::ViolationCode::GoodCauseRentIncreaseExcessive));
        assert!(result
            .decision
            .violations
            .iter()
            .any(|v| v.code == shared_types::ViolationCode::GoodCauseCpiFallbackUsed
                && v.severity == shared_types::Severity::Info));
    }

    #[test]
    fn fcha_invalid_jump_blocked_with_valid_next_states() {
        let record = FchaWorkflowRecord::new("app-1", Utc::now());
        let request = TransitionRequest {
            application_id: "app-1",
            record: &record,
            to_state: FchaState::BackgroundCheckAllowed,
            timestamp: Utc::now(),
            actor_id: "user-1",
            actor_kind: ActorKind::User,
            prequalification_results: None,
            conditional_offer_notice: None,
            background_check: None,
            individualized_assessment: None,
            final_decision_rationale: None,
        };
        let result = fcha_workflow_transition(&nyc(), "1.0.0", request);
        assert!(!result.gate.allowed);
        assert!(result
            .gate
            .decision
            .violations
            .iter()
            .any(|v| v.code == shared_types::ViolationCode::FchaInvalidStateTransition));
    }

    #[test]
    fn fcha_criminal_check_in_prequalification_blocked() {
        let result = fcha_criminal_check(&nyc(), "1.0.0", FchaState::Prequalification);
        assert!(!result.allowed);
        assert!(result
            .decision
            .violations
            .iter()
            .any(|v| v.code == shared_types::ViolationCode::FchaBackgroundCheckNotAllowed));
        assert!(result
            .decision
            .violations
            .iter()
            .any(|v| v.code == shared_types::ViolationCode::FchaConditionalOfferRequired));
    }

    #[test]
    fn fcha_valid_conditional_offer_transition_allowed() {
        let record = FchaWorkflowRecord::new("app-5", Utc::now());
        let prequal = shared_types::PrequalificationResults {
            income_verified: true,
            credit_checked: true,
            rental_history_checked: true,
            employment_verified: true,
        };
        let notice = shared_types::NoticeRecord {
            notice_type: "conditional_offer_letter".to_string(),
            issued_at: Utc::now(),
            delivery_method: shared_types::DeliveryMethod::Email,
            recipient_id: "applicant-5".to_string(),
        };
        let request = TransitionRequest {
            application_id: "app-5",
            record: &record,
            to_state: FchaState::ConditionalOffer,
            timestamp: Utc::now(),
            actor_id: "user-1",
            actor_kind: ActorKind::User,
            prequalification_results: Some(prequal),
            conditional_offer_notice: Some(notice),
            background_check: None,
            individualized_assessment: None,
            final_decision_rationale: None,
        };

        let result = fcha_workflow_transition(&nyc(), "1.0.0", request);
        assert!(result.gate.allowed);
        assert!(result.gate.decision.violations.is_empty());
        let record = result.outcome.record.expect("updated record produced");
        assert_eq!(record.current_state, FchaState::ConditionalOffer);
    }
}
