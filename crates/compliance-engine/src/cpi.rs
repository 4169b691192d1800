//! CPI (Consumer Price Index) provider abstraction.
//!
//! Good Cause rent-increase evaluation needs an annual CPI change percentage
//! per region. [`CpiProvider`] abstracts where that number comes from:
//! [`FallbackCpiProvider`] is a deterministic table with a conservative
//! default, and [`ExternalCpiProvider`] wraps a real data source but always
//! falls back to the deterministic table on failure or when unconfigured —
//! rent-increase checks must never block on a third-party outage.

use async_trait::async_trait;
use std::collections::HashMap;

/// Result of a CPI lookup: the percentage plus whether it came from the
/// deterministic fallback table rather than a live source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpiReading {
    pub percentage: f64,
    pub is_fallback: bool,
}

/// Supplies the annual CPI change percentage for a region.
#[async_trait]
pub trait CpiProvider: Send + Sync {
    async fn get_annual_cpi_change(&self, region: &str) -> CpiReading;
}

const DEFAULT_CPI_PERCENTAGE: f64 = 3.0;

/// Deterministic month-of-year -> percentage table, with a conservative
/// default for regions or months it doesn't cover. Never fails, never blocks.
pub struct FallbackCpiProvider {
    by_region: HashMap<&'static str, f64>,
}

impl FallbackCpiProvider {
    pub fn new() -> Self {
        let mut by_region = HashMap::new();
        by_region.insert("NYC_STRICT", 3.82);
        by_region.insert("CA_STANDARD", 3.1);
        by_region.insert("TX_STANDARD", 2.7);
        by_region.insert("US_STANDARD", DEFAULT_CPI_PERCENTAGE);
        Self { by_region }
    }
}

impl Default for FallbackCpiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CpiProvider for FallbackCpiProvider {
    async fn get_annual_cpi_change(&self, region: &str) -> CpiReading {
        let percentage = self
            .by_region
            .get(region)
            .copied()
            .unwrap_or(DEFAULT_CPI_PERCENTAGE);
        CpiReading {
            percentage,
            is_fallback: true,
        }
    }
}

/// Wraps a live CPI data source. Any failure, including one reported by the
/// inner source's own `Result`, degrades to [`FallbackCpiProvider`] rather
/// than propagating an error up through the rule evaluators.
pub struct ExternalCpiProvider<F> {
    fetch: F,
    fallback: FallbackCpiProvider,
}

impl<F> ExternalCpiProvider<F>
where
    F: Fn(&str) -> Option<f64> + Send + Sync,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            fallback: FallbackCpiProvider::new(),
        }
    }
}

#[async_trait]
impl<F> CpiProvider for ExternalCpiProvider<F>
where
    F: Fn(&str) -> Option<f64> + Send + Sync,
{
    async fn get_annual_cpi_change(&self, region: &str) -> CpiReading {
        match (self.fetch)(region) {
            Some(percentage) => CpiReading {
                percentage,
                is_fallback: false,
            },
            None => {
                tracing::warn!(region, "CPI_ANNUAL_CHANGE_FALLBACK");
                self.fallback.get_annual_cpi_change(region).await
            }
        }
    }
}
