//! # Core Types
//!
//! Asset identities, samples, quotes and snapshots shared between the
//! signal processor and the publication layer.

use serde::{Deserialize, Serialize};

use crate::constants::PRICE_SCALE;
use crate::errors::{CoreError, CoreResult};

/// Number of assets in the fixed basket
pub const ASSET_COUNT: usize = 4;

/// The fixed commodity basket, ordered by composite anchor weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetId {
    Gold,
    Silver,
    Platinum,
    Palladium,
}

impl AssetId {
    /// All basket members in canonical order
    pub const ALL: [AssetId; ASSET_COUNT] = [
        AssetId::Gold,
        AssetId::Silver,
        AssetId::Platinum,
        AssetId::Palladium,
    ];

    /// Upstream ticker symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            AssetId::Gold => "XAU",
            AssetId::Silver => "XAG",
            AssetId::Platinum => "XPT",
            AssetId::Palladium => "XPD",
        }
    }

    /// Annualized volatility assumed until enough history accumulates.
    /// Relative magnitudes follow observed spot behavior: palladium runs
    /// roughly 2.5x gold.
    pub fn default_volatility(&self) -> f64 {
        match self {
            AssetId::Gold => 0.12,
            AssetId::Silver => 0.22,
            AssetId::Platinum => 0.18,
            AssetId::Palladium => 0.30,
        }
    }

    /// Fixed composite-signal weight, anchored on gold as the least
    /// volatile and most liquid constituent
    pub fn composite_weight(&self) -> f64 {
        match self {
            AssetId::Gold => 0.5,
            AssetId::Silver => 0.2,
            AssetId::Platinum => 0.2,
            AssetId::Palladium => 0.1,
        }
    }

    /// Default index weight bounds [min, max]
    pub fn default_weight_bounds(&self) -> WeightBounds {
        let (min, max) = match self {
            AssetId::Gold => (0.35, 0.55),
            AssetId::Silver => (0.15, 0.30),
            AssetId::Platinum => (0.10, 0.25),
            AssetId::Palladium => (0.05, 0.15),
        };
        WeightBounds { min, max }
    }

    /// Position in the canonical asset order
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single observed price point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Spot price in quote currency units
    pub price: f64,
}

/// Spot quote as returned by the upstream price source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotQuote {
    pub symbol: String,
    pub currency: String,
    pub price: f64,
    pub timestamp: i64,
}

/// Allowed weight range for one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl WeightBounds {
    /// Midpoint of the allowed range
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Clamp a raw weight into the allowed range
    pub fn clamp(&self, weight: f64) -> f64 {
        weight.clamp(self.min, self.max)
    }

    /// Validate ordering and range
    pub fn validate(&self, asset: AssetId) -> CoreResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(CoreError::InvalidWeightBounds {
                asset: asset.symbol(),
                reason: "bounds must be finite".to_string(),
            });
        }
        if self.min < 0.0 || self.max > 1.0 || self.min >= self.max {
            return Err(CoreError::InvalidWeightBounds {
                asset: asset.symbol(),
                reason: format!("expected 0 <= min < max <= 1, got [{}, {}]", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// One complete tick output, consumed by the publication gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub timestamp: i64,
    /// Spot prices in canonical asset order
    pub prices: [f64; ASSET_COUNT],
    /// Smoothed weight vector in canonical asset order
    pub weights: [f64; ASSET_COUNT],
    /// Weighted index value
    pub index_value: f64,
}

impl IndexSnapshot {
    /// Index value at the fixed publication scale, rounded to nearest
    pub fn scaled_index(&self) -> u64 {
        to_scaled(self.index_value)
    }

    /// Constituent prices at the fixed publication scale
    pub fn scaled_prices(&self) -> [u64; ASSET_COUNT] {
        let mut out = [0u64; ASSET_COUNT];
        for (slot, price) in out.iter_mut().zip(self.prices.iter()) {
            *slot = to_scaled(*price);
        }
        out
    }
}

/// Convert a quote-currency value to the fixed publication scale (10^6),
/// rounding to the nearest integer unit. Negative inputs floor at zero.
pub fn to_scaled(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value * PRICE_SCALE as f64).round() as u64
}
