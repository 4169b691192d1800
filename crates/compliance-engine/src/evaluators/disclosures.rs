//! Disclosure delivery and acknowledgement tracking.

use shared_types::{FixPriority, MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::inputs::DisclosureInput;

pub fn evaluate(input: &DisclosureInput, pack: &MarketPack) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    for requirement in pack
        .rules
        .disclosures
        .iter()
        .filter(|d| d.required_before == input.phase)
    {
        if !input
            .delivered_disclosures
            .iter()
            .any(|d| d == &requirement.disclosure_type)
        {
            violations.push(
                Violation::new(
                    ViolationCode::DisclosureNotDelivered,
                    Severity::Violation,
                    format!("Required disclosure '{}' has not been delivered", requirement.disclosure_type),
                )
                .with_evidence(serde_json::json!({ "disclosureType": requirement.disclosure_type })),
            );
            fixes.push(RecommendedFix::new(
                "deliver_disclosure",
                format!("Deliver the '{}' disclosure", requirement.disclosure_type),
                FixPriority::High,
            ));
            continue;
        }

        if requirement.signature_required
            && !input
                .acknowledged_disclosures
                .iter()
                .any(|d| d == &requirement.disclosure_type)
        {
            violations.push(
                Violation::new(
                    ViolationCode::DisclosureNotAcknowledged,
                    Severity::Warning,
                    format!("Required disclosure '{}' has not been acknowledged", requirement.disclosure_type),
                )
                .with_evidence(serde_json::json!({ "disclosureType": requirement.disclosure_type })),
            );
        }
    }

    (violations, fixes)
}
