//! Jurisdiction-aware rental-housing compliance engine.
//!
//! A [`shared_types::MarketPack`] bundles one jurisdiction's rules; this
//! crate resolves which pack applies to a given market identifier, runs the
//! typed rule evaluators against it, and composes the results into the
//! [`shared_types::GateResult`] returned to callers.

pub mod cancellation;
pub mod cpi;
pub mod engine;
pub mod evaluators;
pub mod fcha_machine;
pub mod gates;
pub mod inputs;
pub mod jurisdiction;
pub mod registry;

pub use cancellation::CancellationSignal;
pub use engine::{ComplianceEngine, EngineConfig};
pub use jurisdiction::market_pack_id_from_market;
pub use registry::{get_market_pack, merge_market_pack_with_config};
