//! # Weight Engine
//!
//! Bounded inverse-volatility target weights plus exponential smoothing of
//! the published vector. Both paths end in clamp -> renormalize with no
//! second clamp; the final divide can nudge a clamped weight slightly past
//! its bound. That behavior is intentional and covered by a property test
//! rather than corrected (see DESIGN.md).

use crate::constants::SMOOTHING_LAMBDA;
use crate::errors::{CoreError, CoreResult};
use crate::types::{AssetId, WeightBounds, ASSET_COUNT};

/// Weight vector in canonical asset order
pub type Weights = [f64; ASSET_COUNT];

/// Derives target weights and smooths the published vector toward them
#[derive(Debug, Clone)]
pub struct WeightEngine {
    bounds: [WeightBounds; ASSET_COUNT],
    lambda: f64,
}

impl WeightEngine {
    /// Engine with the default per-asset bounds and smoothing factor
    pub fn new() -> Self {
        let mut bounds = [WeightBounds { min: 0.0, max: 1.0 }; ASSET_COUNT];
        for asset in AssetId::ALL {
            bounds[asset.index()] = asset.default_weight_bounds();
        }
        Self {
            bounds,
            lambda: SMOOTHING_LAMBDA,
        }
    }

    /// Engine with caller-supplied bounds and smoothing factor
    pub fn with_bounds(bounds: [WeightBounds; ASSET_COUNT], lambda: f64) -> CoreResult<Self> {
        for asset in AssetId::ALL {
            bounds[asset.index()].validate(asset)?;
        }
        let min_sum: f64 = bounds.iter().map(|b| b.min).sum();
        let max_sum: f64 = bounds.iter().map(|b| b.max).sum();
        if min_sum > 1.0 || max_sum < 1.0 {
            return Err(CoreError::InfeasibleWeightBounds { min_sum, max_sum });
        }
        Ok(Self { bounds, lambda })
    }

    /// Configured bounds in canonical asset order
    pub fn bounds(&self) -> &[WeightBounds; ASSET_COUNT] {
        &self.bounds
    }

    /// Initial published vector: bound midpoints, normalized to sum 1
    pub fn seed_weights(&self) -> Weights {
        let mut weights = [0.0; ASSET_COUNT];
        for (w, b) in weights.iter_mut().zip(self.bounds.iter()) {
            *w = b.midpoint();
        }
        normalize(&mut weights);
        weights
    }

    /// Bounded inverse-volatility target weights.
    ///
    /// Pure: identical volatility inputs always yield identical output.
    pub fn target_weights(&self, volatilities: &Weights) -> Weights {
        let mut weights = [0.0; ASSET_COUNT];
        for (w, vol) in weights.iter_mut().zip(volatilities.iter()) {
            *w = 1.0 / vol.max(f64::EPSILON);
        }
        normalize(&mut weights);
        self.clamp_and_renormalize(weights)
    }

    /// Move the published vector one step toward the target.
    ///
    /// Sole mutator of the persisted weight vector; call exactly once per
    /// tick. `new = current*(1-lambda) + target*lambda`, reclamped and
    /// renormalized.
    pub fn smooth(&self, current: &Weights, target: &Weights) -> Weights {
        let mut weights = [0.0; ASSET_COUNT];
        for i in 0..ASSET_COUNT {
            weights[i] = current[i] * (1.0 - self.lambda) + target[i] * self.lambda;
        }
        self.clamp_and_renormalize(weights)
    }

    /// Clamp each weight into its bound, then renormalize the clamped
    /// values by their sum. No clamp follows the divide.
    fn clamp_and_renormalize(&self, mut weights: Weights) -> Weights {
        for (w, b) in weights.iter_mut().zip(self.bounds.iter()) {
            *w = b.clamp(*w);
        }
        normalize(&mut weights);
        weights
    }
}

impl Default for WeightEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(weights: &mut Weights) {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        for w in weights.iter_mut() {
            *w /= sum;
        }
    }
}

/// Whether every weight respects its bound (used by callers that want to
/// flag the renormalization overshoot instead of failing on it)
pub fn within_bounds(weights: &Weights, bounds: &[WeightBounds; ASSET_COUNT], tol: f64) -> bool {
    weights
        .iter()
        .zip(bounds.iter())
        .all(|(w, b)| *w >= b.min - tol && *w <= b.max + tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WEIGHT_SUM_TOLERANCE;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn sum(weights: &Weights) -> f64 {
        weights.iter().sum()
    }

    #[test]
    fn test_seed_is_normalized_and_bounded() {
        let engine = WeightEngine::new();
        let seed = engine.seed_weights();
        assert_relative_eq!(sum(&seed), 1.0, epsilon = WEIGHT_SUM_TOLERANCE);
        assert!(within_bounds(&seed, engine.bounds(), 0.0));
        // Gold midpoint 0.45 over midpoint sum 0.95
        assert_relative_eq!(seed[0], 0.45 / 0.95, max_relative = 1e-12);
    }

    #[test]
    fn test_target_weights_pure() {
        let engine = WeightEngine::new();
        let vols = [0.14, 0.25, 0.19, 0.33];
        assert_eq!(engine.target_weights(&vols), engine.target_weights(&vols));
    }

    #[test]
    fn test_default_volatility_scenario() {
        // Raw inverse-vol weights for {0.12, 0.22, 0.18, 0.30} put platinum
        // and palladium below their caps only before normalization; after
        // clamp -> renormalize both sit just past their upper bounds. The
        // sum invariant must hold either way.
        let engine = WeightEngine::new();
        let vols = [0.12, 0.22, 0.18, 0.30];
        let weights = engine.target_weights(&vols);

        assert_relative_eq!(sum(&weights), 1.0, epsilon = WEIGHT_SUM_TOLERANCE);

        // Clamped sum is 0.3828.. + 0.2088.. + 0.25 + 0.15 = 0.9916..,
        // so the divide pushes the two capped weights over by ~0.84%
        assert!(!within_bounds(&weights, engine.bounds(), 0.0));
        assert!(weights[2] > 0.25 && weights[2] < 0.2525);
        assert!(weights[3] > 0.15 && weights[3] < 0.1515);

        // Uncapped constituents stay inside their bounds
        assert!(weights[0] >= 0.35 && weights[0] <= 0.55);
        assert!(weights[1] >= 0.15 && weights[1] <= 0.30);
    }

    #[test]
    fn test_smoothing_geometric_convergence() {
        // Interior vectors: lerp preserves the sum and the bounds, so the
        // clamp and the renormalize are both no-ops and the gap closes by
        // exactly (1 - lambda) per tick
        let engine = WeightEngine::new();
        let target = [0.45, 0.22, 0.20, 0.13];
        let mut current = [0.50, 0.20, 0.18, 0.12];
        let initial_gap: Weights = std::array::from_fn(|i| current[i] - target[i]);

        for k in 1..=25 {
            current = engine.smooth(&current, &target);
            let factor = (1.0 - SMOOTHING_LAMBDA).powi(k);
            for i in 0..ASSET_COUNT {
                assert_relative_eq!(
                    current[i] - target[i],
                    initial_gap[i] * factor,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_smooth_stationary_at_target() {
        let engine = WeightEngine::new();
        let target = [0.45, 0.22, 0.20, 0.13];
        let next = engine.smooth(&target, &target);
        for i in 0..ASSET_COUNT {
            assert_relative_eq!(next[i], target[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_infeasible_bounds_rejected() {
        let bounds = [
            WeightBounds { min: 0.5, max: 0.9 },
            WeightBounds { min: 0.4, max: 0.8 },
            WeightBounds { min: 0.2, max: 0.6 },
            WeightBounds { min: 0.1, max: 0.5 },
        ];
        // Minimums alone sum to 1.2
        assert!(matches!(
            WeightEngine::with_bounds(bounds, 0.08),
            Err(CoreError::InfeasibleWeightBounds { .. })
        ));
    }

    proptest! {
        /// For any volatilities the target vector sums to 1 and each weight
        /// stays inside the quantified overshoot envelope
        /// [min_i / sum(max), max_i / sum(min)].
        #[test]
        fn prop_target_weights_envelope(
            vols in proptest::array::uniform4(0.01f64..2.0)
        ) {
            let engine = WeightEngine::new();
            let weights = engine.target_weights(&vols);

            let total: f64 = weights.iter().sum();
            prop_assert!((total - 1.0).abs() < WEIGHT_SUM_TOLERANCE);

            let min_sum: f64 = engine.bounds().iter().map(|b| b.min).sum();
            let max_sum: f64 = engine.bounds().iter().map(|b| b.max).sum();
            for (w, b) in weights.iter().zip(engine.bounds().iter()) {
                prop_assert!(*w >= b.min / max_sum - 1e-12);
                prop_assert!(*w <= b.max / min_sum + 1e-12);
            }
        }

        /// Smoothing any in-envelope vector toward any target keeps the
        /// sum invariant.
        #[test]
        fn prop_smooth_preserves_sum(
            vols_a in proptest::array::uniform4(0.01f64..2.0),
            vols_b in proptest::array::uniform4(0.01f64..2.0)
        ) {
            let engine = WeightEngine::new();
            let current = engine.target_weights(&vols_a);
            let target = engine.target_weights(&vols_b);
            let next = engine.smooth(&current, &target);

            let total: f64 = next.iter().sum();
            prop_assert!((total - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        }
    }
}
