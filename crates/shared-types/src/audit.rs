//! Tamper-evident audit log for compliance-gate events.
//!
//! Same SHA-256 hash-linking and `verify()` contract as this workspace's
//! document-lifecycle audit chain, re-scoped from PDF events to
//! compliance-gate events.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::severity::Severity;

/// Types of auditable compliance events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    GatePassed {
        gate: String,
    },
    GateBlocked {
        gate: String,
        violation_codes: Vec<String>,
    },
    CpiFallbackUsed {
        region: String,
    },
    MarketUnmapped {
        raw: String,
    },
    FchaTransition {
        from_state: String,
        to_state: String,
    },
}

/// A single audit log entry. `details` is the only free-text payload field —
/// no raw applicant/tenant PII is ever written here (see `recordGateResult`'s
/// PII-free sanitization rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: String,
    pub action: AuditAction,
    pub actor_id: Option<String>,
    pub entity_id: String,
    pub previous_hash: Option<String>,
    pub details: Option<String>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        actor_id: Option<String>,
        entity_id: &str,
        previous_hash: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            action,
            actor_id,
            entity_id: entity_id.to_string(),
            previous_hash,
            details,
        }
    }

    /// Hash of this event, used to chain-link the next one.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.event_id.as_bytes());
        hasher.update(self.timestamp.as_bytes());
        hasher.update(format!("{:?}", self.action).as_bytes());
        hasher.update(self.entity_id.as_bytes());
        if let Some(ref actor) = self.actor_id {
            hasher.update(actor.as_bytes());
        }
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Hash-linked chain of audit events for one entity (listing, application,
/// lease, ...).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditChain {
    pub events: Vec<AuditEvent>,
    pub entity_id: String,
    pub created_at: String,
}

impl AuditChain {
    pub fn new(entity_id: &str) -> Self {
        Self {
            events: Vec::new(),
            entity_id: entity_id.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn last_hash(&self) -> Option<String> {
        self.events.last().map(|e| e.compute_hash())
    }

    /// Append an event, automatically linking it to the previous hash.
    pub fn append(
        &mut self,
        action: AuditAction,
        actor_id: Option<String>,
        details: Option<String>,
    ) -> &AuditEvent {
        let previous_hash = self.last_hash();
        let event = AuditEvent::new(action, actor_id, &self.entity_id, previous_hash, details);
        self.events.push(event);
        self.events.last().unwrap()
    }

    /// Verify the hash chain has not been tampered with.
    pub fn verify(&self) -> Result<(), String> {
        let mut expected_prev: Option<String> = None;

        for (i, event) in self.events.iter().enumerate() {
            if event.previous_hash != expected_prev {
                return Err(format!(
                    "chain broken at event {i}: expected prev {expected_prev:?}, got {:?}",
                    event.previous_hash
                ));
            }
            expected_prev = Some(event.compute_hash());
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("failed to serialize chain: {e}"))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("failed to deserialize chain: {e}"))
    }
}

/// Severity of the worst violation among a set, used to pick the severity
/// tagged on the compliance-check sink record.
pub fn worst_severity(severities: impl IntoIterator<Item = Severity>) -> Option<Severity> {
    severities.into_iter().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_integrity_holds_across_appends() {
        let mut chain = AuditChain::new("listing-123");

        chain.append(
            AuditAction::GatePassed {
                gate: "listing_publish".into(),
            },
            Some("system".into()),
            None,
        );
        chain.append(
            AuditAction::GateBlocked {
                gate: "broker_fee_change".into(),
                violation_codes: vec!["FARE_BROKER_FEE_PROHIBITED".into()],
            },
            Some("system".into()),
            Some("fee rejected".into()),
        );

        assert!(chain.verify().is_ok());
        assert_eq!(chain.events.len(), 2);
    }

    #[test]
    fn tampering_breaks_verification() {
        let mut chain = AuditChain::new("listing-123");
        chain.append(
            AuditAction::GatePassed {
                gate: "listing_publish".into(),
            },
            None,
            None,
        );
        chain.append(
            AuditAction::GatePassed {
                gate: "lease_creation".into(),
            },
            None,
            None,
        );

        chain.events[0].actor_id = Some("mallory".into());

        assert!(chain.verify().is_err());
    }

    #[test]
    fn worst_severity_picks_max() {
        let worst = worst_severity([Severity::Info, Severity::Critical, Severity::Warning]);
        assert_eq!(worst, Some(Severity::Critical));
    }

    #[test]
    fn json_roundtrip_preserves_chain() {
        let mut chain = AuditChain::new("roundtrip-test");
        chain.append(
            AuditAction::GatePassed {
                gate: "lease_creation".into(),
            },
            None,
            None,
        );

        let json = chain.to_json().unwrap();
        let restored = AuditChain::from_json(&json).unwrap();

        assert_eq!(chain.events.len(), restored.events.len());
        assert!(restored.verify().is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn append_preserves_integrity(entity_id in "[a-z0-9-]{8,20}", count in 1usize..20) {
            let mut chain = AuditChain::new(&entity_id);
            for i in 0..count {
                chain.append(
                    AuditAction::GatePassed { gate: format!("gate-{i}") },
                    None,
                    None,
                );
            }
            prop_assert!(chain.verify().is_ok());
            prop_assert_eq!(chain.events.len(), count);
        }

        #[test]
        fn event_ids_unique(count in 2usize..50) {
            let mut chain = AuditChain::new("entity");
            for i in 0..count {
                chain.append(AuditAction::GatePassed { gate: format!("g{i}") }, None, None);
            }
            let ids: std::collections::HashSet<_> = chain.events.iter().map(|e| &e.event_id).collect();
            prop_assert_eq!(ids.len(), count);
        }

        #[test]
        fn tampering_detected(tamper_index in 0usize..5) {
            let mut chain = AuditChain::new("entity");
            for i in 0..6 {
                chain.append(AuditAction::GatePassed { gate: format!("g{i}") }, None, None);
            }
            prop_assert!(chain.verify().is_ok());

            let original = chain.events[tamper_index].actor_id.clone();
            chain.events[tamper_index].actor_id = Some("tampered".into());

            if tamper_index < chain.events.len() - 1 {
                prop_assert!(chain.verify().is_err());
            }

            chain.events[tamper_index].actor_id = original;
            prop_assert!(chain.verify().is_ok());
        }
    }
}
