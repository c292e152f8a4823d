//! # Bullion Core - Index Signal Processing
//!
//! This crate contains the off-chain signal processor for the bullion
//! index: it turns raw per-asset spot prices into a bounded, smoothly
//! adapting weight vector and a single index value. It provides:
//!
//! - Bounded per-asset price history
//! - Annualized log-return volatility estimation with defaults and clamps
//! - Discrete market-regime classification with advisory policies
//! - Inverse-volatility weight derivation and smoothing
//! - Pure index math and fixed-point scaling helpers
//!
//! Nothing here performs I/O or holds authority; admission control lives
//! in `bullion-record` and orchestration in `bullion-keeper`.

pub mod constants;
pub mod errors;
pub mod history;
pub mod index;
pub mod regime;
pub mod types;
pub mod volatility;
pub mod weights;

pub use constants::*;
pub use errors::{CoreError, CoreResult};
pub use history::{AssetSeries, PriceHistory};
pub use index::{change_bps, index_value};
pub use regime::{classify, composite_volatility, RegimePolicy, VolatilityRegime};
pub use types::{
    to_scaled, AssetId, IndexSnapshot, Sample, SpotQuote, WeightBounds, ASSET_COUNT,
};
pub use volatility::{
    default_volatilities, estimate_all, estimate_all_with_defaults, estimate_volatility,
    estimate_with_default,
};
pub use weights::{within_bounds, WeightEngine, Weights};
