//! # Market Regime Classification
//!
//! Maps a volatility-weighted composite signal to one of four discrete
//! regimes. Each regime carries an advisory policy for the publication
//! layer; enforcement lives in the authoritative record, so the two can
//! drift and are pinned together by tests instead.

use serde::{Deserialize, Serialize};

use crate::constants::{
    REGIME_HIGH_THRESHOLD, REGIME_LOW_THRESHOLD, REGIME_MEDIUM_THRESHOLD, TRADING_DAYS_PER_YEAR,
};
use crate::types::{AssetId, ASSET_COUNT};

/// Discrete market-volatility regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Low,
    Medium,
    High,
    Extreme,
}

/// Advisory policy attached to a regime. The record still enforces its own
/// rate and magnitude bounds regardless of what the policy suggests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimePolicy {
    /// Largest price move the publisher should tolerate per update
    pub max_change_fraction: f64,
    /// Multiplier on the base update cadence (slower in rough markets)
    pub cadence_multiplier: u32,
}

impl VolatilityRegime {
    /// Policy parameters for this regime
    pub fn policy(&self) -> RegimePolicy {
        match self {
            VolatilityRegime::Low => RegimePolicy {
                max_change_fraction: 0.01,
                cadence_multiplier: 1,
            },
            VolatilityRegime::Medium => RegimePolicy {
                max_change_fraction: 0.03,
                cadence_multiplier: 1,
            },
            VolatilityRegime::High => RegimePolicy {
                max_change_fraction: 0.05,
                cadence_multiplier: 2,
            },
            VolatilityRegime::Extreme => RegimePolicy {
                max_change_fraction: 0.10,
                cadence_multiplier: 4,
            },
        }
    }
}

impl std::fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VolatilityRegime::Low => "low",
            VolatilityRegime::Medium => "medium",
            VolatilityRegime::High => "high",
            VolatilityRegime::Extreme => "extreme",
        };
        f.write_str(name)
    }
}

/// Weighted composite of annualized volatilities, gold-anchored
pub fn composite_volatility(volatilities: &[f64; ASSET_COUNT]) -> f64 {
    AssetId::ALL
        .iter()
        .map(|asset| asset.composite_weight() * volatilities[asset.index()])
        .sum()
}

/// Classify the basket's current regime from annualized volatilities
pub fn classify(volatilities: &[f64; ASSET_COUNT]) -> VolatilityRegime {
    let daily = composite_volatility(volatilities) / TRADING_DAYS_PER_YEAR.sqrt();

    if daily < REGIME_LOW_THRESHOLD {
        VolatilityRegime::Low
    } else if daily < REGIME_MEDIUM_THRESHOLD {
        VolatilityRegime::Medium
    } else if daily < REGIME_HIGH_THRESHOLD {
        VolatilityRegime::High
    } else {
        VolatilityRegime::Extreme
    }
}
