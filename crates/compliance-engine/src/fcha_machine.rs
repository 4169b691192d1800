//! Fair Chance Housing Act workflow state machine. Enforces that no criminal
//! background inquiry occurs before a written conditional offer, by encoding
//! valid transitions as a constant table rather than scattering `if` ladders
//! across the codebase.

use chrono::{DateTime, Utc};
use shared_types::{
    transition_id, ActorKind, BackgroundCheckSubRecord, CheckType, FchaRules, FchaState,
    FchaTransitionEvidence, FchaWorkflowRecord, FixPriority, IndividualizedAssessmentSubRecord,
    NoticeRecord, PrequalificationResults, RecommendedFix, ResponseWindow, Severity,
    StateHistoryEntry, Violation, ViolationCode,
};

/// Returns the set of states reachable from `state` in one transition.
/// Terminal states return an empty slice.
pub fn valid_successors(state: FchaState) -> &'static [FchaState] {
    match state {
        FchaState::Prequalification => {
            &[FchaState::ConditionalOffer, FchaState::Denied]
        }
        FchaState::ConditionalOffer => {
            &[FchaState::BackgroundCheckAllowed, FchaState::Denied]
        }
        FchaState::BackgroundCheckAllowed => &[
            FchaState::IndividualizedAssessment,
            FchaState::Approved,
            FchaState::Denied,
        ],
        FchaState::IndividualizedAssessment => &[FchaState::Approved, FchaState::Denied],
        FchaState::FinalDecision | FchaState::Approved | FchaState::Denied => &[],
    }
}

/// Request to move an application from its current state to `to_state`.
pub struct TransitionRequest<'a> {
    pub application_id: &'a str,
    pub record: &'a FchaWorkflowRecord,
    pub to_state: FchaState,
    pub timestamp: DateTime<Utc>,
    pub actor_id: &'a str,
    pub actor_kind: ActorKind,
    pub prequalification_results: Option<PrequalificationResults>,
    pub conditional_offer_notice: Option<NoticeRecord>,
    pub background_check: Option<BackgroundCheckSubRecord>,
    pub individualized_assessment: Option<IndividualizedAssessmentSubRecord>,
    pub final_decision_rationale: Option<&'a str>,
}

pub struct TransitionOutcome {
    pub violations: Vec<Violation>,
    pub fixes: Vec<RecommendedFix>,
    pub evidence: Option<FchaTransitionEvidence>,
    pub record: Option<FchaWorkflowRecord>,
}

/// `validateTransition(request, pack)`. If the pack's FCHA rule is disabled,
/// always allows. Otherwise checks the transition against the closed table
/// and the per-target preconditions in order, then (absent a critical
/// violation) produces transition evidence and an updated workflow record.
pub fn validate_transition(request: TransitionRequest<'_>, fcha: Option<&FchaRules>) -> TransitionOutcome {
    let Some(fcha) = fcha.filter(|r| r.enabled) else {
        return TransitionOutcome {
            violations: Vec::new(),
            fixes: Vec::new(),
            evidence: None,
            record: None,
        };
    };

    let mut violations = Vec::new();
    let mut fixes = Vec::new();
    let from_state = request.record.current_state;

    if !valid_successors(from_state).contains(&request.to_state) {
        let valid: Vec<&'static str> = valid_successors(from_state).iter().map(FchaState::as_str).collect();
        violations.push(
            Violation::new(
                ViolationCode::FchaInvalidStateTransition,
                Severity::Critical,
                format!("{from_state} cannot transition to {}", request.to_state),
            )
            .with_evidence(serde_json::json!({ "validNextStates": valid })),
        );
        return TransitionOutcome {
            violations,
            fixes,
            evidence: None,
            record: None,
        };
    }

    let mut notices = Vec::new();
    let mut response_window = None;

    match request.to_state {
        FchaState::ConditionalOffer => {
            let complete = request
                .prequalification_results
                .as_ref()
                .is_some_and(PrequalificationResults::all_complete);
            if !complete {
                violations.push(Violation::new(
                    ViolationCode::FchaPrequalificationIncomplete,
                    Severity::Critical,
                    "Prequalification results are incomplete; all four checks must pass before a conditional offer",
                ));
            }
            match request.conditional_offer_notice {
                Some(ref notice) => notices.push(notice.clone()),
                None => violations.push(Violation::new(
                    ViolationCode::FchaNoticeNotIssued,
                    Severity::Critical,
                    "Conditional offer letter has not been issued",
                )),
            }
        }
        FchaState::BackgroundCheckAllowed => {
            let signed = request
                .background_check
                .as_ref()
                .is_some_and(|b| b.authorization_signed);
            if !signed {
                violations.push(Violation::new(
                    ViolationCode::FchaNoticeNotIssued,
                    Severity::Critical,
                    "Background check authorization has not been signed",
                ));
            }
        }
        FchaState::IndividualizedAssessment => {
            let adverse_info_found = request
                .background_check
                .as_ref()
                .is_some_and(|b| b.adverse_info_found);
            if adverse_info_found && request.conditional_offer_notice.is_none() {
                violations.push(Violation::new(
                    ViolationCode::FchaNoticeNotIssued,
                    Severity::Critical,
                    "Adverse information notice has not been delivered",
                ));
            }
            response_window = Some(ResponseWindow {
                opens_at: request.timestamp,
                closes_at: request.timestamp
                    + chrono::Duration::days(fcha.workflow.mitigating_factors_response_days as i64),
                days_allowed: fcha.workflow.mitigating_factors_response_days,
                purpose: "mitigating_factors_response".to_string(),
            });
        }
        FchaState::Denied if from_state == FchaState::IndividualizedAssessment => {
            let factors_considered = request
                .individualized_assessment
                .as_ref()
                .map(|a| !a.article_23a_factors_considered.is_empty())
                .unwrap_or(false);
            if !factors_considered {
                violations.push(Violation::new(
                    ViolationCode::FchaIndividualizedAssessmentRequired,
                    Severity::Critical,
                    "Article 23-A factors must be considered before denial following individualized assessment",
                ));
            }
        }
        _ => {}
    }

    if matches!(request.to_state, FchaState::Approved | FchaState::Denied) {
        let rationale_present = request
            .final_decision_rationale
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false);
        if !rationale_present {
            violations.push(Violation::new(
                ViolationCode::FchaFinalDecisionRationaleMissing,
                Severity::Critical,
                "Final decision rationale must be recorded",
            ));
            fixes.push(RecommendedFix::new(
                "record_final_decision_rationale",
                "Record the rationale supporting the final decision",
                FixPriority::Critical,
            ));
        }
    }

    if violations.iter().any(|v| v.severity == Severity::Critical) {
        return TransitionOutcome {
            violations,
            fixes,
            evidence: None,
            record: None,
        };
    }

    let tid = transition_id(request.application_id, request.timestamp);
    let evidence = FchaTransitionEvidence {
        application_id: request.application_id.to_string(),
        transition_id: tid.clone(),
        from_state,
        to_state: request.to_state,
        timestamp: request.timestamp,
        actor_id: request.actor_id.to_string(),
        actor_kind: request.actor_kind,
        notices_issued: notices.clone(),
        response_window: response_window.clone(),
        background_check: request.background_check.clone(),
        individualized_assessment: request.individualized_assessment.clone(),
        prequalification_results: request.prequalification_results.clone(),
    };

    let mut record = request.record.clone();
    if let Some(last) = record.state_history.last_mut() {
        last.exited_at = Some(request.timestamp);
        last.transition_id = Some(tid.clone());
    }
    record.current_state = request.to_state;
    record.state_history.push(StateHistoryEntry {
        state: request.to_state,
        entered_at: request.timestamp,
        exited_at: None,
        transition_id: Some(tid),
    });
    match request.to_state {
        FchaState::ConditionalOffer => {
            record.conditional_offer_issued_at = Some(request.timestamp);
        }
        FchaState::BackgroundCheckAllowed => {
            record.background_check_allowed_at = Some(request.timestamp);
        }
        FchaState::IndividualizedAssessment => {
            record.individualized_assessment_started_at = Some(request.timestamp);
        }
        FchaState::Approved | FchaState::Denied => {
            record.final_decision_at = Some(request.timestamp);
            record.final_decision_result = Some(request.to_state);
        }
        _ => {}
    }
    record.active_response_window = response_window;

    TransitionOutcome {
        violations,
        fixes,
        evidence: Some(evidence),
        record: Some(record),
    }
}

/// `validateBackgroundCheck(request, pack)`. Criminal checks require the
/// application to be past the conditional-offer stage; prequalification
/// checks are always allowed; unknown check types pass with a warning.
pub fn validate_background_check(
    current_state: FchaState,
    check_type: &CheckType,
    fcha: Option<&FchaRules>,
) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    let Some(fcha) = fcha.filter(|r| r.enabled) else {
        return (violations, fixes);
    };
    let _ = fcha;

    if check_type.is_criminal() {
        let allowed_states = [
            FchaState::BackgroundCheckAllowed,
            FchaState::IndividualizedAssessment,
        ];
        if !allowed_states.contains(&current_state) {
            violations.push(
                Violation::new(
                    ViolationCode::FchaBackgroundCheckNotAllowed,
                    Severity::Critical,
                    format!("Criminal background checks are not allowed while the application is in {current_state}"),
                )
                .with_evidence(serde_json::json!({ "currentState": current_state.as_str() })),
            );
            violations.push(Violation::new(
                ViolationCode::FchaConditionalOfferRequired,
                Severity::Critical,
                "A written conditional offer must be issued before any criminal background inquiry",
            ));
            fixes.push(RecommendedFix::new(
                "issue_conditional_offer",
                "Complete prequalification and issue a conditional offer before requesting a criminal background check",
                FixPriority::Critical,
            ));
            fixes.push(RecommendedFix::new(
                "await_background_check_allowed",
                "Wait until the application reaches BACKGROUND_CHECK_ALLOWED before running this check",
                FixPriority::High,
            ));
        }
        return (violations, fixes);
    }

    if check_type.is_prequalification() {
        return (violations, fixes);
    }

    violations.push(Violation::new(
        ViolationCode::FchaUnknownCheckType,
        Severity::Warning,
        "Unrecognized check type; allowed with a warning",
    ));
    (violations, fixes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(valid_successors(FchaState::Approved).is_empty());
        assert!(valid_successors(FchaState::Denied).is_empty());
        assert!(valid_successors(FchaState::FinalDecision).is_empty());
    }

    #[test]
    fn invalid_jump_blocked_with_valid_next_states() {
        let record = FchaWorkflowRecord::new("app-1", Utc::now());
        let outcome = validate_transition(
            TransitionRequest {
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
            },
            Some(&FchaRules { enabled: true, workflow: Default::default() }),
        );
        assert!(outcome
            .violations
            .iter()
            .any(|v| v.code == ViolationCode::FchaInvalidStateTransition));
        assert!(outcome.evidence.is_none());
    }

    #[test]
    fn valid_conditional_offer_transition_allowed() {
        let record = FchaWorkflowRecord::new("app-2", Utc::now());
        let prequal = PrequalificationResults {
            income_verified: true,
            credit_checked: true,
            rental_history_checked: true,
            employment_verified: true,
        };
        let notice = NoticeRecord {
            notice_type: "conditional_offer_letter".to_string(),
            issued_at: Utc::now(),
            delivery_method: shared_types::DeliveryMethod::Email,
            recipient_id: "applicant-1".to_string(),
        };
        let outcome = validate_transition(
            TransitionRequest {
                application_id: "app-2",
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
            },
            Some(&FchaRules { enabled: true, workflow: Default::default() }),
        );
        assert!(outcome.violations.is_empty());
        let evidence = outcome.evidence.expect("evidence produced");
        assert_eq!(evidence.notices_issued[0].notice_type, "conditional_offer_letter");
        let record = outcome.record.expect("record produced");
        assert_eq!(record.current_state, FchaState::ConditionalOffer);
        assert!(record.conditional_offer_issued_at.is_some());
    }

    #[test]
    fn criminal_check_during_prequalification_blocked() {
        let (violations, fixes) = validate_background_check(
            FchaState::Prequalification,
            &CheckType::CriminalBackgroundCheck,
            Some(&FchaRules { enabled: true, workflow: Default::default() }),
        );
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::FchaBackgroundCheckNotAllowed));
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::FchaConditionalOfferRequired));
        assert!(!fixes.is_empty());
    }

    #[test]
    fn criminal_check_after_conditional_offer_allowed() {
        let (violations, _) = validate_background_check(
            FchaState::BackgroundCheckAllowed,
            &CheckType::CriminalBackgroundCheck,
            Some(&FchaRules { enabled: true, workflow: Default::default() }),
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn prequalification_check_always_allowed() {
        let (violations, _) = validate_background_check(
            FchaState::Prequalification,
            &CheckType::IncomeVerification,
            Some(&FchaRules { enabled: true, workflow: Default::default() }),
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn disabled_fcha_always_allows() {
        let (violations, _) =
            validate_background_check(FchaState::Prequalification, &CheckType::CriminalBackgroundCheck, None);
        assert!(violations.is_empty());
    }
}
