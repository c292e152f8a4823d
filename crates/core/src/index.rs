//! # Index Calculation
//!
//! The scalar index is a plain weighted sum of constituent prices. Pure
//! functions only.

use crate::constants::BPS_DENOMINATOR;
use crate::types::ASSET_COUNT;

/// Weighted index value: sum of weight_i * price_i
pub fn index_value(prices: &[f64; ASSET_COUNT], weights: &[f64; ASSET_COUNT]) -> f64 {
    prices.iter().zip(weights.iter()).map(|(p, w)| p * w).sum()
}

/// Absolute change between two scaled prices in basis points of the old
/// value, rounded down. A reporting helper for logs and diagnostics; the
/// record enforces its magnitude bound with its own integer math, which
/// rounds the bound rather than the change and can disagree by one
/// smallest unit at the boundary.
pub fn change_bps(new_value: u64, old_value: u64) -> u64 {
    if old_value == 0 {
        return if new_value == 0 { 0 } else { BPS_DENOMINATOR };
    }

    let diff = new_value.abs_diff(old_value);
    ((diff as u128 * BPS_DENOMINATOR as u128) / old_value as u128) as u64
}
