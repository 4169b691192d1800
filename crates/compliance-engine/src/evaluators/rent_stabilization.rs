//! Rent stabilization: legal vs. preferential rent, registration status.

use shared_types::{MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::inputs::RentStabilizationInput;

pub fn evaluate(
    input: &RentStabilizationInput,
    pack: &MarketPack,
) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let fixes = Vec::new();

    let Some(rules) = pack.rules.rent_stabilization.as_ref().filter(|r| r.enabled) else {
        return (violations, fixes);
    };

    if input.preferential_rent > input.legal_rent {
        violations.push(
            Violation::new(
                ViolationCode::RentStabPreferentialExceedsLegal,
                Severity::Critical,
                format!(
                    "Preferential rent of {} exceeds the registered legal rent of {}",
                    input.preferential_rent, input.legal_rent
                ),
            )
            .with_evidence(serde_json::json!({
                "preferentialRent": input.preferential_rent,
                "legalRent": input.legal_rent,
            })),
        );
    }

    if rules.registration_required && !input.registered {
        violations.push(Violation::new(
            ViolationCode::RentStabRegistrationMissing,
            Severity::Violation,
            "Unit is not registered with the rent stabilization board",
        ));
    }

    (violations, fixes)
}
