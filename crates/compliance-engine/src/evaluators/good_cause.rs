//! Good Cause rent-increase and eviction-reason constraints. The only
//! evaluator that performs I/O: it looks up the annual CPI change.

use shared_types::{MarketPack, RecommendedFix, Severity, Violation, ViolationCode};

use crate::cpi::CpiProvider;
use crate::inputs::RentIncreaseInput;

pub async fn evaluate(
    input: &RentIncreaseInput,
    pack: &MarketPack,
    cpi: &dyn CpiProvider,
) -> (Vec<Violation>, Vec<RecommendedFix>) {
    let mut violations = Vec::new();
    let fixes = Vec::new();

    let Some(good_cause) = pack.rules.good_cause.as_ref().filter(|r| r.enabled) else {
        return (violations, fixes);
    };

    let reading = cpi.get_annual_cpi_change(&input.region).await;
    if reading.is_fallback {
        tracing::info!(
            target: "CPI_ANNUAL_CHANGE_FALLBACK",
            region = %input.region,
            percentage = reading.percentage,
            "CPI lookup fell back to the deterministic table"
        );
        violations.push(Violation::new(
            ViolationCode::GoodCauseCpiFallbackUsed,
            Severity::Info,
            format!(
                "Annual CPI change for {} used the deterministic fallback table ({}%)",
                input.region, reading.percentage
            ),
        ));
    }

    let max_percent = reading.percentage + good_cause.max_rent_increase_over_cpi;
    let actual_percent =
        (input.proposed_rent - input.current_rent) / input.current_rent * 100.0;

    if actual_percent > max_percent {
        violations.push(
            Violation::new(
                ViolationCode::GoodCauseRentIncreaseExcessive,
                Severity::Critical,
                format!(
                    "Rent increase of {actual_percent:.2}% exceeds the Good Cause cap of {max_percent:.2}% (CPI {}% + {}%)",
                    reading.percentage, good_cause.max_rent_increase_over_cpi
                ),
            )
            .with_evidence(serde_json::json!({
                "actualPercent": actual_percent,
                "maxPercent": max_percent,
                "cpiPercentage": reading.percentage,
            })),
        );
    }

    if input.notice_days < pack.rules.rent_increase.notice_days {
        violations.push(Violation::new(
            ViolationCode::GoodCauseNoticePeriodInsufficient,
            Severity::Violation,
            format!(
                "Notice period of {} days is below the required {} days",
                input.notice_days, pack.rules.rent_increase.notice_days
            ),
        ));
    }

    if let Some(reason) = input.eviction_reason.as_deref() {
        if !good_cause.valid_eviction_reasons.iter().any(|r| r == reason) {
            violations.push(
                Violation::new(
                    ViolationCode::GoodCauseEvictionInvalidReason,
                    Severity::Critical,
                    format!("Eviction reason '{reason}' is not a valid Good Cause reason in this market"),
                )
                .with_evidence(serde_json::json!({ "validReasons": good_cause.valid_eviction_reasons })),
            );
        }
    }

    (violations, fixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::FallbackCpiProvider;
    use crate::registry;
    use shared_types::MarketPackId;

    #[tokio::test]
    async fn excessive_increase_blocked_with_fallback_info() {
        let pack = registry::get_market_pack(MarketPackId::NycStrict).unwrap();
        let cpi = FallbackCpiProvider::new();
        let input = RentIncreaseInput {
            region: "nyc".to_string(),
            current_rent: 2000.0,
            proposed_rent: 2500.0,
            notice_days: 30,
            eviction_reason: None,
        };
        let (violations, _) = evaluate(&input, &pack, &cpi).await;
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::GoodCauseRentIncreaseExcessive));
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::GoodCauseCpiFallbackUsed && v.severity == Severity::Info));
    }

    #[tokio::test]
    async fn insufficient_notice_flagged() {
        let pack = registry::get_market_pack(MarketPackId::NycStrict).unwrap();
        let cpi = FallbackCpiProvider::new();
        let input = RentIncreaseInput {
            region: "nyc".to_string(),
            current_rent: 2000.0,
            proposed_rent: 2020.0,
            notice_days: 5,
            eviction_reason: None,
        };
        let (violations, _) = evaluate(&input, &pack, &cpi).await;
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::GoodCauseNoticePeriodInsufficient));
    }

    #[tokio::test]
    async fn invalid_eviction_reason_flagged() {
        let pack = registry::get_market_pack(MarketPackId::NycStrict).unwrap();
        let cpi = FallbackCpiProvider::new();
        let input = RentIncreaseInput {
            region: "nyc".to_string(),
            current_rent: 2000.0,
            proposed_rent: 2020.0,
            notice_days: 30,
            eviction_reason: Some("because_i_said_so".to_string()),
        };
        let (violations, _) = evaluate(&input, &pack, &cpi).await;
        assert!(violations
            .iter()
            .any(|v| v.code == ViolationCode::GoodCauseEvictionInvalidReason));
    }
}
