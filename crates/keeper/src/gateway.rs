//! Publication gateway
//!
//! Orchestrates one tick end to end: fetch, record history, estimate,
//! classify, reweight, compute the index, publish. A rejection from the
//! record ends the tick without retry; history and weight mutations made
//! earlier in the tick are deliberately kept, so the processor keeps
//! learning from observed prices even when publication fails.

use std::sync::Arc;
use std::time::Duration;

use bullion_core::{
    change_bps, classify, estimate_all_with_defaults, index_value, AssetId, IndexSnapshot,
    PriceHistory, VolatilityRegime, WeightEngine, Weights, ASSET_COUNT,
};
use bullion_record::{ConstituentPrices, PriceRecord, RecordError};

use crate::error::KeeperResult;
use crate::source::PriceSource;

/// Outcome of one publication tick
#[derive(Debug)]
pub enum TickOutcome {
    /// Update accepted and committed by the record
    Published { snapshot: IndexSnapshot },
    /// Update rejected by the record; no retry until the next tick
    Rejected {
        snapshot: IndexSnapshot,
        reason: RecordError,
    },
    /// Dry run: computed but not submitted
    Skipped { snapshot: IndexSnapshot },
}

/// Off-chain publication gateway. Owns the mutable signal state; exactly
/// one gateway drives one record, one tick at a time.
pub struct PublicationGateway<S: PriceSource> {
    source: S,
    record: Arc<PriceRecord>,
    engine: WeightEngine,
    history: PriceHistory,
    /// Published weight vector, seeded at normalized bound midpoints and
    /// mutated only by the per-tick smoothing step
    weights: Weights,
    /// Per-asset volatility priors used until an asset has enough history
    default_vols: Weights,
    updater_id: String,
    fetch_spacing: Duration,
    dry_run: bool,
}

impl<S: PriceSource> PublicationGateway<S> {
    pub fn new(
        source: S,
        record: Arc<PriceRecord>,
        engine: WeightEngine,
        default_vols: Weights,
        updater_id: impl Into<String>,
        fetch_spacing: Duration,
        dry_run: bool,
    ) -> Self {
        let weights = engine.seed_weights();
        Self {
            source,
            record,
            engine,
            history: PriceHistory::new(),
            weights,
            default_vols,
            updater_id: updater_id.into(),
            fetch_spacing,
            dry_run,
        }
    }

    /// Run one tick at the given wall-clock timestamp.
    ///
    /// Fetch failures abort the tick (already-recorded samples stay);
    /// record rejections are reported as an outcome, not an error.
    pub async fn tick(&mut self, now: i64) -> KeeperResult<TickOutcome> {
        let prices = self.fetch_all(now).await?;

        let volatilities = estimate_all_with_defaults(&self.history, &self.default_vols);
        let regime = classify(&volatilities);
        self.log_regime(regime, &volatilities);

        let target = self.engine.target_weights(&volatilities);
        // Sole mutation of the published vector, once per tick
        self.weights = self.engine.smooth(&self.weights, &target);

        let value = index_value(&prices, &self.weights);
        let snapshot = IndexSnapshot {
            timestamp: now,
            prices,
            weights: self.weights,
            index_value: value,
        };

        if self.dry_run {
            log::info!(
                "dry run: index {:.4} at t={} not submitted",
                snapshot.index_value,
                now
            );
            log::debug!(
                "dry run snapshot: {}",
                serde_json::to_string(&snapshot).unwrap_or_default()
            );
            return Ok(TickOutcome::Skipped { snapshot });
        }

        let scaled = snapshot.scaled_prices();
        let constituents = ConstituentPrices {
            gold: scaled[AssetId::Gold.index()],
            silver: scaled[AssetId::Silver.index()],
            platinum: scaled[AssetId::Platinum.index()],
            palladium: scaled[AssetId::Palladium.index()],
            timestamp: now,
        };

        let stored = self.record.reading();
        if stored.last_update > 0 {
            log::debug!(
                "proposing scaled index {} against stored {} ({} bps move)",
                snapshot.scaled_index(),
                stored.price,
                change_bps(snapshot.scaled_index(), stored.price)
            );
        }

        match self.record.set_price_with_constituents(
            &self.updater_id,
            snapshot.scaled_index(),
            constituents,
            now,
        ) {
            Ok(()) => {
                log::info!(
                    "published index {} (scaled {}) at t={}",
                    snapshot.index_value,
                    snapshot.scaled_index(),
                    now
                );
                Ok(TickOutcome::Published { snapshot })
            }
            Err(reason) => {
                log::warn!("record rejected update at t={}: {}", now, reason);
                Ok(TickOutcome::Rejected { snapshot, reason })
            }
        }
    }

    /// Fetch all four assets sequentially with a courtesy delay between
    /// upstream calls. Each successful fetch is recorded into history
    /// immediately; a failure aborts the remainder of the tick.
    async fn fetch_all(&mut self, now: i64) -> KeeperResult<[f64; ASSET_COUNT]> {
        let mut prices = [0.0; ASSET_COUNT];
        for (i, asset) in AssetId::ALL.iter().enumerate() {
            if i > 0 && !self.fetch_spacing.is_zero() {
                tokio::time::sleep(self.fetch_spacing).await;
            }
            let quote = self.source.fetch(*asset).await?;
            log::debug!(
                "{}: {} {} at t={}",
                asset,
                quote.price,
                quote.currency,
                quote.timestamp
            );
            self.history.record(*asset, quote.price, now);
            prices[asset.index()] = quote.price;
        }
        Ok(prices)
    }

    fn log_regime(&self, regime: VolatilityRegime, volatilities: &Weights) {
        let policy = regime.policy();
        log::debug!(
            "regime {} (vols {:.4?}); advisory max change {:.1}%, cadence x{}",
            regime,
            volatilities,
            policy.max_change_fraction * 100.0,
            policy.cadence_multiplier
        );
    }

    /// Current published weight vector
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Total samples accumulated across the basket
    pub fn history_samples(&self) -> usize {
        self.history.total_samples()
    }
}
