//! General broker-fee rules: who may be charged, and how much.

use shared_types::{FeePayer, FixPriority, MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::inputs::BrokerFeeInput;

pub fn evaluate(input: &BrokerFeeInput, pack: &MarketPack) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();
    let rules = &pack.rules.broker_fee;

    if !rules.enabled || !input.has_broker_fee {
        return (violations, fixes);
    }

    if rules.paid_by == FeePayer::Landlord && input.broker_fee_paid_by == FeePayer::Tenant {
        violations.push(Violation::new(
            ViolationCode::BrokerFeePaidByTenantProhibited,
            Severity::Critical,
            "Broker fee must be paid by the landlord in this market",
        ));
        fixes.push(RecommendedFix::new(
            "remove_broker_fee",
            "Reassign the broker fee to the landlord",
            FixPriority::Critical,
        ));
    }

    let cap = rules.max_multiplier * input.monthly_rent;
    if input.broker_fee_amount > cap {
        violations.push(
            Violation::new(
                ViolationCode::BrokerFeeExcessive,
                Severity::Violation,
                format!(
                    "Broker fee of {} exceeds the cap of {} ({}x monthly rent)",
                    input.broker_fee_amount, cap, rules.max_multiplier
                ),
            )
            .with_evidence(serde_json::json!({
                "brokerFeeAmount": input.broker_fee_amount,
                "cap": cap,
            })),
        );
        fixes.push(
            RecommendedFix::new(
                "reduce_broker_fee",
                format!("Reduce the broker fee to at most {cap}"),
                FixPriority::High,
            )
            .with_auto_fix("cap_broker_fee"),
        );
    }

    (violations, fixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use shared_types::MarketPackId;

    #[test]
    fn tenant_paid_fee_blocked_when_market_requires_landlord() {
        let pack = registry::get_market_pack(MarketPackId::NycStrict).unwrap();
        let input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Tenant,
            broker_fee_amount: 1000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let (violations, _) = evaluate(&input, &pack);
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::BrokerFeePaidByTenantProhibited));
    }

    #[test]
    fn either_payer_market_allows_tenant_paid() {
        let pack = registry::get_market_pack(MarketPackId::TxStandard).unwrap();
        let input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Tenant,
            broker_fee_amount: 1000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let (violations, _) = evaluate(&input, &pack);
        assert!(violations.is_empty());
    }

    #[test]
    fn excessive_fee_flagged() {
        let pack = registry::get_market_pack(MarketPackId::TxStandard).unwrap();
        let input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Either,
            broker_fee_amount: 10_000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let (violations, _) = evaluate(&input, &pack);
        assert!(violations.iter().any(|v| v.code == ViolationCode::BrokerFeeExcessive));
    }
}
