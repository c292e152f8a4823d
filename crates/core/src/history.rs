//! # Price History
//!
//! Bounded, time-ordered sample buffers per asset. Append-only with
//! oldest-eviction; the only mutation is `record`.

use std::collections::VecDeque;

use crate::constants::HISTORY_CAPACITY;
use crate::errors::{CoreError, CoreResult};
use crate::types::{AssetId, Sample, ASSET_COUNT};

/// Bounded time series of observed prices for one asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSeries {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl AssetSeries {
    /// Create an empty series with the given capacity
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity);
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a sample, evicting the oldest when full. O(1) amortized.
    pub fn record(&mut self, price: f64, timestamp: i64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { timestamp, price });
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stored samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Most recent sample, if any
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }
}

/// History store covering the whole basket
#[derive(Debug, Clone)]
pub struct PriceHistory {
    series: [AssetSeries; ASSET_COUNT],
}

impl PriceHistory {
    /// Create empty histories at the default capacity
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY).expect("default capacity is non-zero")
    }

    /// Create empty histories with a custom per-asset capacity
    pub fn with_capacity(capacity: usize) -> CoreResult<Self> {
        Ok(Self {
            series: [
                AssetSeries::new(capacity)?,
                AssetSeries::new(capacity)?,
                AssetSeries::new(capacity)?,
                AssetSeries::new(capacity)?,
            ],
        })
    }

    /// Record one observed price for an asset
    pub fn record(&mut self, asset: AssetId, price: f64, timestamp: i64) {
        self.series[asset.index()].record(price, timestamp);
    }

    /// Series for one asset
    pub fn series(&self, asset: AssetId) -> &AssetSeries {
        &self.series[asset.index()]
    }

    /// Total samples across the basket
    pub fn total_samples(&self) -> usize {
        self.series.iter().map(|s| s.len()).sum()
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}
