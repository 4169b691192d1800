//! Security deposit cap enforcement.

use shared_types::{FixPriority, MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::inputs::SecurityDepositInput;

pub fn evaluate(
    input: &SecurityDepositInput,
    pack: &MarketPack,
) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();
    let rules = &pack.rules.security_deposit;

    if !rules.enabled {
        return (violations, fixes);
    }

    let cap = rules.max_months * input.monthly_rent;
    if input.security_deposit_amount > cap {
        violations.push(
            Violation::new(
                ViolationCode::SecurityDepositExcessive,
                Severity::Critical,
                format!(
                    "Security deposit of {} exceeds the cap of {} ({} months' rent)",
                    input.security_deposit_amount, cap, rules.max_months
                ),
            )
            .with_evidence(serde_json::json!({
                "securityDepositAmount": input.security_deposit_amount,
                "cap": cap,
            })),
        );
        fixes.push(
            RecommendedFix::new(
                "reduce_security_deposit",
                format!("Reduce the security deposit to at most {cap}"),
                FixPriority::Critical,
            )
            .with_auto_fix("cap_security_deposit"),
        );
    }

    (violations, fixes)
}
