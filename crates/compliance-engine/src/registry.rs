//! Market Pack registry — immutable, versioned rule bundles keyed by
//! jurisdiction, with a merge operation for per-tenant database overrides.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use shared_types::{
    BrokerFeeRules, ComplianceError, ComplianceResult, DisclosurePhase, DisclosureRequirement,
    FareActRules, FchaRules, FchaWorkflowRules, FeePayer, GdprRules, GoodCauseRules, MarketPack,
    MarketPackId, MarketRules, PackVersion, RentIncreaseRules, RentStabilizationRules,
    SecurityDepositRules,
};

fn lead_paint_disclosure() -> DisclosureRequirement {
    DisclosureRequirement {
        disclosure_type: "lead_paint_disclosure".to_string(),
        required_before: DisclosurePhase::ListingPublish,
        signature_required: true,
        expiration_days: None,
    }
}

fn build_nyc_strict() -> MarketPack {
    MarketPack {
        id: MarketPackId::NycStrict,
        name: "New York City — Strict".to_string(),
        version: PackVersion::new(1, 0, 0),
        effective_date: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
        jurisdiction: "New York City, NY".to_string(),
        rules: MarketRules {
            broker_fee: BrokerFeeRules {
                enabled: true,
                paid_by: FeePayer::Landlord,
                max_multiplier: 1.0,
                exemptions: Vec::new(),
            },
            security_deposit: SecurityDepositRules {
                enabled: true,
                max_months: 1.0,
                interest_required: true,
                separate_account_required: true,
                return_days: 14,
            },
            rent_increase: RentIncreaseRules {
                enabled: true,
                cpi_plus_percentage: 5.0,
                max_percentage: 10.0,
                notice_required: true,
                notice_days: 30,
                good_cause_required: true,
            },
            disclosures: vec![
                lead_paint_disclosure(),
                DisclosureRequirement {
                    disclosure_type: "fare_act_disclosure".to_string(),
                    required_before: DisclosurePhase::Application,
                    signature_required: false,
                    expiration_days: None,
                },
            ],
            fare_act: Some(FareActRules {
                enabled: true,
                max_income_multiplier: 40.0,
                max_credit_score_threshold: 700,
                fee_disclosure_required: true,
            }),
            fcha: Some(FchaRules {
                enabled: true,
                workflow: FchaWorkflowRules::default(),
            }),
            good_cause: Some(GoodCauseRules {
                enabled: true,
                max_rent_increase_over_cpi: 5.0,
                valid_eviction_reasons: vec![
                    "nonpayment_of_rent".to_string(),
                    "lease_violation".to_string(),
                    "nuisance".to_string(),
                    "owner_occupancy".to_string(),
                    "demolition".to_string(),
                ],
            }),
            rent_stabilization: Some(RentStabilizationRules {
                enabled: true,
                registration_required: true,
            }),
            gdpr: None,
            extra: serde_json::Map::new(),
        },
        merged_from_db: false,
    }
}

fn build_ca_standard() -> MarketPack {
    MarketPack {
        id: MarketPackId::CaStandard,
        name: "California — Standard".to_string(),
        version: PackVersion::new(1, 0, 0),
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        jurisdiction: "California".to_string(),
        rules: MarketRules {
            broker_fee: BrokerFeeRules {
                enabled: true,
                paid_by: FeePayer::Either,
                max_multiplier: 1.0,
                exemptions: Vec::new(),
            },
            security_deposit: SecurityDepositRules {
                enabled: true,
                max_months: 2.0,
                interest_required: false,
                separate_account_required: false,
                return_days: 21,
            },
            rent_increase: RentIncreaseRules {
                enabled: true,
                cpi_plus_percentage: 5.0,
                max_percentage: 10.0,
                notice_required: true,
                notice_days: 90,
                good_cause_required: true,
            },
            disclosures: vec![lead_paint_disclosure()],
            fare_act: None,
            fcha: None,
            good_cause: Some(GoodCauseRules {
                enabled: true,
                max_rent_increase_over_cpi: 5.0,
                valid_eviction_reasons: vec![
                    "nonpayment_of_rent".to_string(),
                    "lease_violation".to_string(),
                    "owner_move_in".to_string(),
                ],
            }),
            rent_stabilization: None,
            gdpr: None,
            extra: serde_json::Map::new(),
        },
        merged_from_db: false,
    }
}

fn build_tx_standard() -> MarketPack {
    MarketPack {
        id: MarketPackId::TxStandard,
        name: "Texas — Standard".to_string(),
        version: PackVersion::new(1, 0, 0),
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        jurisdiction: "Texas".to_string(),
        rules: MarketRules {
            broker_fee: BrokerFeeRules {
                enabled: true,
                paid_by: FeePayer::Either,
                max_multiplier: 2.0,
                exemptions: Vec::new(),
            },
            security_deposit: SecurityDepositRules {
                enabled: true,
                max_months: 3.0,
                interest_required: false,
                separate_account_required: false,
                return_days: 30,
            },
            rent_increase: RentIncreaseRules {
                enabled: false,
                cpi_plus_percentage: 0.0,
                max_percentage: 0.0,
                notice_required: false,
                notice_days: 0,
                good_cause_required: false,
            },
            disclosures: vec![lead_paint_disclosure()],
            fare_act: None,
            fcha: None,
            good_cause: None,
            rent_stabilization: None,
            gdpr: None,
            extra: serde_json::Map::new(),
        },
        merged_from_db: false,
    }
}

fn build_us_standard() -> MarketPack {
    MarketPack {
        id: MarketPackId::UsStandard,
        name: "United States — Standard".to_string(),
        version: PackVersion::new(1, 0, 0),
        effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        jurisdiction: "United States".to_string(),
        rules: MarketRules {
            broker_fee: BrokerFeeRules {
                enabled: true,
                paid_by: FeePayer::Either,
                max_multiplier: 1.0,
                exemptions: Vec::new(),
            },
            security_deposit: SecurityDepositRules {
                enabled: true,
                max_months: 2.0,
                interest_required: false,
                separate_account_required: false,
                return_days: 30,
            },
            rent_increase: RentIncreaseRules {
                enabled: false,
                cpi_plus_percentage: 0.0,
                max_percentage: 0.0,
                notice_required: false,
                notice_days: 0,
                good_cause_required: false,
            },
            disclosures: vec![lead_paint_disclosure()],
            fare_act: None,
            fcha: None,
            good_cause: None,
            rent_stabilization: None,
            gdpr: None,
            extra: serde_json::Map::new(),
        },
        merged_from_db: false,
    }
}

fn build_gdpr_pack(id: MarketPackId, name: &str, jurisdiction: &str) -> MarketPack {
    MarketPack {
        id,
        name: name.to_string(),
        version: PackVersion::new(1, 0, 0),
        effective_date: NaiveDate::from_ymd_opt(2018, 5, 25).unwrap(),
        jurisdiction: jurisdiction.to_string(),
        rules: MarketRules {
            broker_fee: BrokerFeeRules {
                enabled: true,
                paid_by: FeePayer::Either,
                max_multiplier: 1.0,
                exemptions: Vec::new(),
            },
            security_deposit: SecurityDepositRules {
                enabled: true,
                max_months: 2.0,
                interest_required: false,
                separate_account_required: false,
                return_days: 30,
            },
            rent_increase: RentIncreaseRules {
                enabled: false,
                cpi_plus_percentage: 0.0,
                max_percentage: 0.0,
                notice_required: false,
                notice_days: 0,
                good_cause_required: false,
            },
            disclosures: vec![lead_paint_disclosure()],
            fare_act: None,
            fcha: None,
            good_cause: None,
            rent_stabilization: None,
            gdpr: Some(GdprRules {
                enabled: true,
                retention_days: 730,
                data_subject_request_days: 30,
                sensitive_fields: vec![
                    "national_id".to_string(),
                    "health_data".to_string(),
                    "criminal_record".to_string(),
                ],
            }),
            extra: serde_json::Map::new(),
        },
        merged_from_db: false,
    }
}

fn build_registry() -> HashMap<MarketPackId, MarketPack> {
    let mut map = HashMap::new();
    map.insert(MarketPackId::NycStrict, build_nyc_strict());
    map.insert(MarketPackId::CaStandard, build_ca_standard());
    map.insert(MarketPackId::TxStandard, build_tx_standard());
    map.insert(MarketPackId::UsStandard, build_us_standard());
    map.insert(
        MarketPackId::UkGdpr,
        build_gdpr_pack(MarketPackId::UkGdpr, "United Kingdom — GDPR/UK GDPR", "United Kingdom"),
    );
    map.insert(
        MarketPackId::EuGdpr,
        build_gdpr_pack(MarketPackId::EuGdpr, "European Union — GDPR", "European Union"),
    );
    map.insert(
        MarketPackId::LatamStandard,
        build_gdpr_pack(
            MarketPackId::LatamStandard,
            "Latin America — Standard",
            "Latin America",
        ),
    );
    map
}

static REGISTRY: OnceLock<HashMap<MarketPackId, MarketPack>> = OnceLock::new();

fn registry() -> &'static HashMap<MarketPackId, MarketPack> {
    REGISTRY.get_or_init(build_registry)
}

/// Fetch the in-code default pack for `id`. Fails only if the registry was
/// somehow asked for an id it does not carry a default for — in practice this
/// cannot happen since [`MarketPackId`] is a closed enum and every variant is
/// inserted by [`build_registry`].
pub fn get_market_pack(id: MarketPackId) -> ComplianceResult<MarketPack> {
    registry()
        .get(&id)
        .cloned()
        .ok_or(ComplianceError::UnknownMarketPack(id))
}

/// Deep-merge a database-supplied configuration over a pack's in-code
/// defaults. DB keys win. Returns the original pack unchanged when `db_config`
/// is `None`; otherwise returns a new value flagged `_mergedFromDb = true`.
pub fn merge_market_pack_with_config(
    pack: MarketPack,
    db_config: Option<serde_json::Value>,
) -> MarketPack {
    let Some(overrides) = db_config else {
        return pack;
    };

    let mut base = serde_json::to_value(&pack).expect("MarketPack always serializes");
    deep_merge(&mut base, &overrides);

    let mut merged: MarketPack =
        serde_json::from_value(base).expect("merged pack still matches MarketPack's shape");
    merged.merged_from_db = true;
    merged
}

fn deep_merge(base: &mut serde_json::Value, overrides: &serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, override_value),
                    None => {
                        base_map.insert(key.clone(), override_value.clone());
                    }
                }
            }
        }
        (base_slot, override_value) => {
            *base_slot = override_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_pack_declares_required_sub_records() {
        for id in [
            MarketPackId::NycStrict,
            MarketPackId::CaStandard,
            MarketPackId::TxStandard,
            MarketPackId::UsStandard,
            MarketPackId::UkGdpr,
            MarketPackId::EuGdpr,
            MarketPackId::LatamStandard,
        ] {
            let pack = get_market_pack(id).unwrap();
            assert_eq!(pack.id, id);
            // broker_fee / security_deposit / rent_increase / disclosures are
            // non-optional fields, so simply constructing the pack proves
            // they're declared; this also exercises the accessors.
            assert!(pack.rules.broker_fee.max_multiplier >= 0.0);
            assert!(pack.rules.security_deposit.max_months >= 0.0);
            let _ = pack.rules.rent_increase.notice_days;
            let _ = pack.rules.disclosures.len();
        }
    }

    #[test]
    fn merge_with_none_is_identity() {
        let pack = get_market_pack(MarketPackId::NycStrict).unwrap();
        let merged = merge_market_pack_with_config(pack.clone(), None);
        assert!(!merged.merged_from_db);
        assert_eq!(
            serde_json::to_string(&merged).unwrap(),
            serde_json::to_string(&pack).unwrap()
        );
    }

    #[test]
    fn merge_overrides_nested_field_and_flags_merged() {
        let pack = get_market_pack(MarketPackId::NycStrict).unwrap();
        let overrides = json!({ "rules": { "securityDeposit": { "maxMonths": 2.0 } } });

        let merged = merge_market_pack_with_config(pack.clone(), Some(overrides));

        assert!(merged.merged_from_db);
        assert_eq!(merged.rules.security_deposit.max_months, 2.0);
        // Unrelated fields are untouched.
        assert_eq!(
            merged.rules.security_deposit.return_days,
            pack.rules.security_deposit.return_days
        );
        assert_eq!(merged.rules.broker_fee.max_multiplier, pack.rules.broker_fee.max_multiplier);
    }

    #[test]
    fn registry_is_immutable_across_calls() {
        let first = get_market_pack(MarketPackId::TxStandard).unwrap();
        let second = get_market_pack(MarketPackId::TxStandard).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
