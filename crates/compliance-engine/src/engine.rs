//! Compliance Engine orchestrator: resolves effective market packs, caches
//! them, fans out to optional injected collaborators (per-tenant config,
//! feature flags, audit/compliance-check sinks), and records gate outcomes.
//!
//! Gates themselves stay free functions in [`crate::gates`] — the engine's
//! job is everything around them: pack resolution/caching, the side-effect
//! seams, and cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::{
    AuditAction, ComplianceResult, EntityKind, GateResult, MarketPack, MarketPackId, Severity,
};
use tracing::{info, instrument, warn};

use crate::cancellation::CancellationSignal;
use crate::cpi::{CpiProvider, FallbackCpiProvider};
use crate::jurisdiction::{is_known_market, market_pack_id_from_market};
use crate::registry;

/// Configuration knobs a caller supplies when constructing the engine. No
/// CLI surface, no environment variables beyond an optional CPI API key.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub pack_cache_enabled: bool,
    pub audit_emission_enabled: bool,
    pub control_id: String,
    pub cpi_api_key: Option<String>,
    pub policy_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pack_cache_enabled: true,
            audit_emission_enabled: true,
            control_id: "CC7.3".to_string(),
            cpi_api_key: None,
            policy_version: "1.0.0".to_string(),
        }
    }
}

/// Fetches a tenant's database overrides for a resolved market pack. Merged
/// on top of the registry default by [`registry::merge_market_pack_with_config`].
#[async_trait::async_trait]
pub trait MarketConfigFetcher: Send + Sync {
    async fn fetch_market_config(&self, market_id: MarketPackId) -> Option<serde_json::Value>;
}

/// Resolves whether a named feature is enabled, optionally scoped to a
/// market. Consulted before the pack-level `enabled` flag on a rule set.
#[async_trait::async_trait]
pub trait FeatureFlagResolver: Send + Sync {
    async fn is_enabled(&self, feature: &str, market_id: MarketPackId) -> bool;
}

/// Appends a tamper-evident audit event for one gate outcome. Best-effort:
/// failures are logged and swallowed, never propagated to the gate's caller.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        entity_id: &str,
        action: AuditAction,
        actor_id: Option<String>,
        details: Option<String>,
    ) -> ComplianceResult<String>;
}

/// Records a compliance-check row (entity, gate, worst severity, pass/fail)
/// for downstream reporting. Same best-effort contract as [`AuditSink`].
#[async_trait::async_trait]
pub trait ComplianceCheckSink: Send + Sync {
    async fn record(
        &self,
        entity_kind: EntityKind,
        entity_id: &str,
        gate: &str,
        worst_severity: Option<Severity>,
        passed: bool,
    ) -> ComplianceResult<String>;
}

/// Orchestrates pack resolution/caching and the optional side-effect seams
/// around a gate call. Gates are pure/re-entrant; this is where the
/// suspension points (config fetch, feature flags, sinks) live.
pub struct ComplianceEngine {
    config: EngineConfig,
    pack_cache: RwLock<HashMap<MarketPackId, MarketPack>>,
    cpi_provider: Arc<dyn CpiProvider>,
    config_fetcher: Option<Arc<dyn MarketConfigFetcher>>,
    feature_flags: Option<Arc<dyn FeatureFlagResolver>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    compliance_check_sink: Option<Arc<dyn ComplianceCheckSink>>,
    cancellation: CancellationSignal,
}

impl ComplianceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            pack_cache: RwLock::new(HashMap::new()),
            cpi_provider: Arc::new(FallbackCpiProvider::new()),
            config_fetcher: None,
            feature_flags: None,
            audit_sink: None,
            compliance_check_sink: None,
            cancellation: CancellationSignal::new(),
        }
    }

    pub fn with_cpi_provider(mut self, cpi_provider: Arc<dyn CpiProvider>) -> Self {
        self.cpi_provider = cpi_provider;
        self
    }

    pub fn with_config_fetcher(mut self, fetcher: Arc<dyn MarketConfigFetcher>) -> Self {
        self.config_fetcher = Some(fetcher);
        self
    }

    pub fn with_feature_flags(mut self, resolver: Arc<dyn FeatureFlagResolver>) -> Self {
        self.feature_flags = Some(resolver);
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn with_compliance_check_sink(mut self, sink: Arc<dyn ComplianceCheckSink>) -> Self {
        self.compliance_check_sink = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cpi_provider(&self) -> &Arc<dyn CpiProvider> {
        &self.cpi_provider
    }

    /// A clone of the engine's cancellation signal. Cancelling it interrupts
    /// outstanding config-fetch/sink calls made through this engine.
    pub fn cancellation_signal(&self) -> CancellationSignal {
        self.cancellation.clone()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Drop every cached pack, forcing the next [`Self::get_effective_market_pack`]
    /// call per market to re-fetch and re-merge.
    pub fn clear_pack_cache(&self) {
        self.pack_cache.write().clear();
    }

    /// Resolve, cache, and (if a config fetcher is installed) merge a raw
    /// market identifier down to its effective pack.
    #[instrument(skip(self), fields(market_id = %market_id))]
    pub async fn get_effective_market_pack(&self, market_id: &str) -> ComplianceResult<MarketPack> {
        let pack_id = market_pack_id_from_market(market_id);
        if pack_id == MarketPackId::UsStandard && !is_known_market(market_id) {
            info!(raw = %market_id, "unmapped market, falling back to US_STANDARD");
        }

        if self.config.pack_cache_enabled {
            if let Some(cached) = self.pack_cache.read().get(&pack_id).cloned() {
                return Ok(cached);
            }
        }

        let base = registry::get_market_pack(pack_id)?;

        let pack = if let Some(fetcher) = &self.config_fetcher {
            tokio::select! {
                db_config = fetcher.fetch_market_config(pack_id) => {
                    registry::merge_market_pack_with_config(base, db_config)
                }
                _ = self.cancellation.cancelled() => {
                    warn!("market config fetch cancelled, using uncustomized pack");
                    base
                }
            }
        } else {
            base
        };

        if self.config.pack_cache_enabled {
            self.pack_cache.write().insert(pack_id, pack.clone());
        }

        Ok(pack)
    }

    pub fn get_market_pack_version(pack: &MarketPack) -> String {
        pack.version.to_string()
    }

    /// Consults the injected [`FeatureFlagResolver`] if one is installed;
    /// with none installed every feature is considered enabled, matching the
    /// "enabled unless told otherwise" default every rule set already uses.
    pub async fn is_compliance_feature_enabled(&self, feature: &str, market_id: &str) -> bool {
        let pack_id = market_pack_id_from_market(market_id);
        match &self.feature_flags {
            Some(resolver) => {
                tokio::select! {
                    enabled = resolver.is_enabled(feature, pack_id) => enabled,
                    _ = self.cancellation.cancelled() => {
                        warn!(feature, "feature flag lookup cancelled, defaulting to enabled");
                        true
                    }
                }
            }
            None => true,
        }
    }

    /// Best-effort telemetry for one gate outcome: writes an audit event and
    /// a compliance-check row if the corresponding sinks are installed.
    /// Sink failures are logged via `tracing::warn!` and never propagated —
    /// the gate's own [`GateResult`] is the source of truth regardless of
    /// whether this bookkeeping succeeds.
    #[instrument(skip(self, result), fields(gate = %gate_name, entity_id = %entity_id, allowed = result.allowed))]
    pub async fn record_gate_result(
        &self,
        entity_kind: EntityKind,
        entity_id: &str,
        gate_name: &str,
        result: &GateResult,
    ) -> (Option<String>, Option<String>) {
        let audit_id = if self.config.audit_emission_enabled {
            match &self.audit_sink {
                Some(sink) => {
                    let action = if result.allowed {
                        AuditAction::GatePassed {
                            gate: gate_name.to_string(),
                        }
                    } else {
                        AuditAction::GateBlocked {
                            gate: gate_name.to_string(),
                            violation_codes: result
                                .decision
                                .violations
                                .iter()
                                .map(|v| format!("{:?}", v.code))
                                .collect(),
                        }
                    };
                    match sink
                        .record(entity_id, action, None, result.blocked_reason.clone())
                        .await
                    {
                        Ok(id) => Some(id),
                        Err(err) => {
                            warn!(error = %err, "audit sink failed, continuing without an audit id");
                            None
                        }
                    }
                }
                None => None,
            }
        } else {
            None
        };

        let compliance_check_id = if result.decision.violations.is_empty() {
            None
        } else {
            let worst_severity = result.decision.violations.iter().map(|v| v.severity).max();
            match &self.compliance_check_sink {
                Some(sink) => {
                    match sink
                        .record(entity_kind, entity_id, gate_name, worst_severity, result.allowed)
                        .await
                    {
                        Ok(id) => Some(id),
                        Err(err) => {
                            warn!(error = %err, "compliance-check sink failed, continuing without a check id");
                            None
                        }
                    }
                }
                None => None,
            }
        };

        (audit_id, compliance_check_id)
    }
}
