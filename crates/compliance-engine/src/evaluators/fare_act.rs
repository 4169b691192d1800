//! NYC FARE Act (Fairness in Apartment Rental Expenses): the party that
//! engaged the broker pays the broker's fee.

use shared_types::{FeePayer, FixPriority, MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::inputs::BrokerFeeInput;

pub fn evaluate(input: &BrokerFeeInput, pack: &MarketPack) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    let Some(fare_act) = pack.rules.fare_act.as_ref().filter(|r| r.enabled) else {
        return (violations, fixes);
    };

    if input.has_broker_fee
        && input.broker_fee_paid_by == FeePayer::Tenant
        && pack.rules.broker_fee.paid_by == FeePayer::Landlord
    {
        violations.push(
            Violation::new(
                ViolationCode::FareBrokerFeeProhibited,
                Severity::Critical,
                "FARE Act requires the party that engaged the broker to pay the fee; a tenant-paid broker fee is prohibited in this market",
            )
            .with_rule_reference("FARE Act"),
        );
        fixes.push(RecommendedFix::new(
            "remove_broker_fee",
            "Remove the tenant-paid broker fee or reassign it to the party that engaged the broker",
            FixPriority::Critical,
        ));
    }

    if let Some(multiplier) = input.income_requirement_multiplier {
        if multiplier > fare_act.max_income_multiplier {
            violations.push(Violation::new(
                ViolationCode::FareIncomeRequirementExcessive,
                Severity::Violation,
                format!(
                    "Income requirement of {multiplier}x rent exceeds the FARE Act maximum of {}x",
                    fare_act.max_income_multiplier
                ),
            ));
        }
    }

    if let Some(threshold) = input.credit_score_threshold {
        if threshold > fare_act.max_credit_score_threshold {
            violations.push(Violation::new(
                ViolationCode::FareCreditScoreThresholdExcessive,
                Severity::Violation,
                format!(
                    "Credit score threshold of {threshold} exceeds the FARE Act maximum of {}",
                    fare_act.max_credit_score_threshold
                ),
            ));
        }
    }

    if input.broker_fee_paid_by == FeePayer::Tenant
        && !input.fee_disclosed
        && fare_act.fee_disclosure_required
    {
        violations.push(Violation::new(
            ViolationCode::FareFeeDisclosureMissing,
            Severity::Violation,
            "Tenant-paid broker fee must be disclosed before application",
        ));
        fixes.push(RecommendedFix::new(
            "disclose_broker_fee",
            "Disclose the broker fee amount and payer before the applicant proceeds",
            FixPriority::Medium,
        ));
    }

    (violations, fixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use shared_types::MarketPackId;

    fn nyc() -> MarketPack {
        registry::get_market_pack(MarketPackId::NycStrict).unwrap()
    }

    fn tx() -> MarketPack {
        registry::get_market_pack(MarketPackId::TxStandard).unwrap()
    }

    #[test]
    fn tenant_paid_fee_blocked_in_nyc() {
        let input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Tenant,
            broker_fee_amount: 3000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let (violations, _) = evaluate(&input, &nyc());
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::FareBrokerFeeProhibited && v.severity == Severity::Critical));
    }

    #[test]
    fn texas_has_no_fare_act_rules() {
        let input = BrokerFeeInput {
            has_broker_fee: true,
            broker_fee_paid_by: FeePayer::Tenant,
            broker_fee_amount: 3000.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: None,
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let (violations, _) = evaluate(&input, &tx());
        assert!(violations.is_empty());
    }

    #[test]
    fn excessive_income_multiplier_flagged() {
        let input = BrokerFeeInput {
            has_broker_fee: false,
            broker_fee_paid_by: FeePayer::Landlord,
            broker_fee_amount: 0.0,
            monthly_rent: 3000.0,
            income_requirement_multiplier: Some(50.0),
            credit_score_threshold: None,
            fee_disclosed: true,
        };
        let (violations, _) = evaluate(&input, &nyc());
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::FareIncomeRequirementExcessive));
    }
}
