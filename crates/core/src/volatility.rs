//! # Volatility Estimation
//!
//! Annualized log-return volatility per asset, with conservative per-asset
//! defaults while history is thin. Estimates are clamped so a quiet or
//! berserk tape can never push weighting off the rails.

use crate::constants::{
    MIN_VOLATILITY_SAMPLES, PERIODS_PER_YEAR, VOLATILITY_CEILING, VOLATILITY_FLOOR,
};
use crate::history::{AssetSeries, PriceHistory};
use crate::types::{AssetId, ASSET_COUNT};

/// Built-in per-asset defaults in canonical order
pub fn default_volatilities() -> [f64; ASSET_COUNT] {
    let mut vols = [0.0; ASSET_COUNT];
    for asset in AssetId::ALL {
        vols[asset.index()] = asset.default_volatility();
    }
    vols
}

/// Annualized volatility for one asset's history, using the asset's
/// built-in default while history is thin
pub fn estimate_volatility(asset: AssetId, series: &AssetSeries) -> f64 {
    estimate_with_default(series, asset.default_volatility())
}

/// Annualized volatility with a caller-supplied fallback.
///
/// Falls back to `default_vol` below [`MIN_VOLATILITY_SAMPLES`].
/// Non-positive prices are skipped when building the return series rather
/// than treated as errors.
pub fn estimate_with_default(series: &AssetSeries, default_vol: f64) -> f64 {
    if series.len() < MIN_VOLATILITY_SAMPLES {
        return default_vol;
    }

    let prices: Vec<f64> = series
        .samples()
        .map(|s| s.price)
        .filter(|p| *p > 0.0)
        .collect();

    let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    if returns.is_empty() {
        return default_vol;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    // Population variance: the sample set is the whole window, not a draw
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let annualized = variance.sqrt() * PERIODS_PER_YEAR.sqrt();

    annualized.clamp(VOLATILITY_FLOOR, VOLATILITY_CEILING)
}

/// Volatility estimates for the whole basket, in canonical asset order
pub fn estimate_all(history: &PriceHistory) -> [f64; ASSET_COUNT] {
    estimate_all_with_defaults(history, &default_volatilities())
}

/// Basket estimates with caller-supplied per-asset fallbacks, in
/// canonical asset order
pub fn estimate_all_with_defaults(
    history: &PriceHistory,
    defaults: &[f64; ASSET_COUNT],
) -> [f64; ASSET_COUNT] {
    let mut vols = [0.0; ASSET_COUNT];
    for asset in AssetId::ALL {
        vols[asset.index()] = estimate_with_default(history.series(asset), defaults[asset.index()]);
    }
    vols
}
