//! # Index Core Constants
//!
//! Fundamental parameters for the signal processor:
//! - Fixed-point publication scale
//! - History buffer sizing and sampling cadence
//! - Volatility estimation bounds
//! - Weight smoothing factor
//! - Regime classification thresholds

// ============================================================================
// Fixed-Point Scale
// ============================================================================

/// Scale factor for every price crossing the publication boundary (10^6)
pub const PRICE_SCALE: u64 = 1_000_000;

/// Decimal places implied by [`PRICE_SCALE`]
pub const PRICE_DECIMALS: u32 = 6;

/// Basis points denominator (10,000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

// ============================================================================
// Sampling and History
// ============================================================================

/// Per-asset history capacity: one day of 5-minute samples
pub const HISTORY_CAPACITY: usize = 288;

/// Nominal spacing between samples in seconds
pub const NOMINAL_SAMPLE_INTERVAL_SECS: u64 = 300;

/// Samples required before computing volatility from history
pub const MIN_VOLATILITY_SAMPLES: usize = 12;

/// Sampling periods in one year at the nominal interval
pub const PERIODS_PER_YEAR: f64 = (365 * 24 * 3600 / NOMINAL_SAMPLE_INTERVAL_SECS) as f64;

// ============================================================================
// Volatility Bounds
// ============================================================================

/// Floor for annualized volatility estimates (5%)
pub const VOLATILITY_FLOOR: f64 = 0.05;

/// Ceiling for annualized volatility estimates (80%)
pub const VOLATILITY_CEILING: f64 = 0.80;

/// Trading days per year, used to convert annualized to daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

// ============================================================================
// Weight Smoothing
// ============================================================================

/// Smoothing factor applied to the published weight vector each tick.
/// Smaller values converge slower and move less weight per tick.
pub const SMOOTHING_LAMBDA: f64 = 0.08;

/// Tolerance for the weight-sum invariant
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Regime Thresholds (daily-equivalent composite volatility)
// ============================================================================

/// Below this the market is classified Low
pub const REGIME_LOW_THRESHOLD: f64 = 0.01;

/// Below this (and above Low) the market is classified Medium
pub const REGIME_MEDIUM_THRESHOLD: f64 = 0.03;

/// Below this (and above Medium) the market is classified High; above is Extreme
pub const REGIME_HIGH_THRESHOLD: f64 = 0.06;
