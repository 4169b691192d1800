use crate::market_pack::MarketPackId;

/// Engine-level errors — the "exceptional" tier. Domain verdicts (a blocked
/// gate) are never represented here; they live in [`crate::ComplianceDecision`]
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("unknown market pack: {0:?}")]
    UnknownMarketPack(MarketPackId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type ComplianceResult<T> = Result<T, ComplianceError>;
