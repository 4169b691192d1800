//! GDPR data-protection checks for GDPR-enabled markets.

use shared_types::{MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::inputs::GdprInput;

pub fn evaluate(input: &GdprInput, pack: &MarketPack) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let fixes = Vec::new();

    let Some(rules) = pack.rules.gdpr.as_ref().filter(|r| r.enabled) else {
        return (violations, fixes);
    };

    if !input.consent_given {
        violations.push(Violation::new(
            ViolationCode::GdprConsentMissing,
            Severity::Critical,
            "Data subject consent has not been recorded",
        ));
    }

    if !input.lawful_basis_present {
        violations.push(Violation::new(
            ViolationCode::GdprLawfulBasisMissing,
            Severity::Critical,
            "No lawful basis for processing has been recorded",
        ));
    }

    if let Some(age_days) = input.data_age_days {
        if age_days > rules.retention_days {
            violations.push(
                Violation::new(
                    ViolationCode::GdprDataRetentionExceeded,
                    Severity::Violation,
                    format!(
                        "Data is {age_days} days old, exceeding the {}-day retention limit",
                        rules.retention_days
                    ),
                )
                .with_evidence(serde_json::json!({ "dataAgeDays": age_days })),
            );
        }
    }

    if let Some(request_age_days) = input.data_subject_request_age_days {
        if request_age_days > rules.data_subject_request_days && !input.data_subject_request_resolved
        {
            violations.push(Violation::new(
                ViolationCode::GdprDataSubjectRequestOverdue,
                Severity::Critical,
                format!(
                    "Data subject request is {request_age_days} days old, exceeding the {}-day response window",
                    rules.data_subject_request_days
                ),
            ));
        }
    }

    let unredacted: Vec<&String> = input
        .sensitive_fields_present
        .iter()
        .filter(|f| rules.sensitive_fields.contains(f) && !input.redacted_fields.contains(f))
        .collect();
    if !unredacted.is_empty() {
        violations.push(
            Violation::new(
                ViolationCode::GdprRedactionRequired,
                Severity::Critical,
                format!("Sensitive field(s) present without redaction: {unredacted:?}"),
            )
            .with_evidence(serde_json::json!({ "unredactedFields": unredacted })),
        );
    }

    (violations, fixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use shared_types::MarketPackId;

    fn input() -> GdprInput {
        GdprInput {
            consent_given: true,
            lawful_basis_present: true,
            data_age_days: Some(100),
            data_subject_request_age_days: None,
            data_subject_request_resolved: false,
            sensitive_fields_present: Vec::new(),
            redacted_fields: Vec::new(),
        }
    }

    #[test]
    fn missing_consent_blocked() {
        let pack = registry::get_market_pack(MarketPackId::EuGdpr).unwrap();
        let mut i = input();
        i.consent_given = false;
        let (violations, _) = evaluate(&i, &pack);
        assert!(violations.iter().any(|v| v.code == ViolationCode::GdprConsentMissing));
    }

    #[test]
    fn retention_exceeded_flagged() {
        let pack = registry::get_market_pack(MarketPackId::EuGdpr).unwrap();
        let mut i = input();
        i.data_age_days = Some(10_000);
        let (violations, _) = evaluate(&i, &pack);
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::GdprDataRetentionExceeded));
    }

    #[test]
    fn unredacted_sensitive_field_blocked() {
        let pack = registry::get_market_pack(MarketPackId::EuGdpr).unwrap();
        let mut i = input();
        i.sensitive_fields_present = vec!["health_data".to_string()];
        let (violations, _) = evaluate(&i, &pack);
        assert!(violations.iter().any(|v| v.code == ViolationCode::GdprRedactionRequired));
    }

    #[test]
    fn compliant_input_passes() {
        let pack = registry::get_market_pack(MarketPackId::EuGdpr).unwrap();
        let (violations, _) = evaluate(&input(), &pack);
        assert!(violations.is_empty());
    }

    #[test]
    fn disabled_outside_gdpr_markets() {
        let pack = registry::get_market_pack(MarketPackId::NycStrict).unwrap();
        let mut i = input();
        i.consent_given = false;
        let (violations, _) = evaluate(&i, &pack);
        assert!(violations.is_empty());
    }
}
