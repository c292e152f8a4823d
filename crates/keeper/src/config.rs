//! Keeper configuration loaded from a TOML file

use std::fs;

use serde::{Deserialize, Serialize};

use bullion_core::{
    default_volatilities, AssetId, WeightBounds, WeightEngine, ASSET_COUNT, SMOOTHING_LAMBDA,
};
use bullion_record::PriceRecord;

use crate::error::{KeeperError, KeeperResult};

/// Top-level keeper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeeperConfig {
    /// Identity the keeper publishes under (must hold the update role)
    pub updater_id: String,

    /// Seconds between publication ticks
    pub poll_interval_secs: u64,

    /// Courtesy delay between consecutive upstream calls (milliseconds)
    #[serde(default = "default_fetch_spacing_ms")]
    pub fetch_spacing_ms: u64,

    /// Log a warning when the record has not accepted an update for this
    /// many seconds
    #[serde(default = "default_stale_alert_secs")]
    pub stale_alert_secs: i64,

    /// Authoritative record settings
    pub record: RecordConfig,

    /// Upstream spot-price source settings
    pub source: SourceConfig,

    /// Optional weight-engine overrides; defaults apply when omitted
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Settings for the record this keeper hosts and publishes into
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordConfig {
    /// Identity holding the administrative role
    pub admin_id: String,

    /// Minimum seconds between accepted updates
    pub min_update_interval_secs: i64,

    /// Maximum accepted change per update, basis points (1-10000)
    pub max_change_rate_bps: u32,
}

/// Upstream spot-price API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Base URL of the spot-price API
    pub base_url: String,

    /// API credential sent with each request
    pub api_key: String,

    /// Quote currency requested from the source
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Optional weight-engine overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WeightsConfig {
    /// Smoothing factor; the engine default applies when omitted
    pub lambda: Option<f64>,

    /// Per-asset bound overrides as (min, max), keyed by canonical order:
    /// gold, silver, platinum, palladium
    pub bounds: Option<[(f64, f64); ASSET_COUNT]>,

    /// Per-asset annualized volatility priors used while an asset has too
    /// little history to estimate, same canonical order as `bounds`
    pub default_vols: Option<[f64; ASSET_COUNT]>,
}

impl KeeperConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> KeeperResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            KeeperError::InvalidConfig(format!("failed to read config file {}: {}", path, e))
        })?;

        let config: KeeperConfig = toml::from_str(&content).map_err(|e| {
            KeeperError::InvalidConfig(format!("failed to parse config file {}: {}", path, e))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &str) -> KeeperResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KeeperError::InvalidConfig(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration; any failure here is fatal at startup
    pub fn validate(&self) -> KeeperResult<()> {
        if self.updater_id.is_empty() {
            return Err(KeeperError::InvalidConfig(
                "updater_id must be non-empty".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(KeeperError::InvalidConfig(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.record.admin_id.is_empty() {
            return Err(KeeperError::InvalidConfig(
                "record.admin_id must be non-empty".to_string(),
            ));
        }

        if self.record.min_update_interval_secs < 0 {
            return Err(KeeperError::InvalidConfig(
                "record.min_update_interval_secs must be non-negative".to_string(),
            ));
        }

        if self.record.max_change_rate_bps == 0 || self.record.max_change_rate_bps > 10_000 {
            return Err(KeeperError::InvalidConfig(format!(
                "record.max_change_rate_bps must be in 1..=10000, got {}",
                self.record.max_change_rate_bps
            )));
        }

        if self.source.base_url.is_empty() {
            return Err(KeeperError::InvalidConfig(
                "source.base_url must be non-empty".to_string(),
            ));
        }

        if let Some(lambda) = self.weights.lambda {
            if !(0.0..=1.0).contains(&lambda) {
                return Err(KeeperError::InvalidConfig(format!(
                    "weights.lambda must be in [0, 1], got {}",
                    lambda
                )));
            }
        }

        // Bound feasibility is re-checked by the engine; surface obvious
        // mistakes here with the offending asset named
        if let Some(bounds) = &self.weights.bounds {
            for (asset, (min, max)) in AssetId::ALL.iter().zip(bounds.iter()) {
                if min >= max || *min < 0.0 || *max > 1.0 {
                    return Err(KeeperError::InvalidConfig(format!(
                        "weights.bounds for {}: expected 0 <= min < max <= 1, got [{}, {}]",
                        asset, min, max
                    )));
                }
            }
        }

        if let Some(vols) = &self.weights.default_vols {
            for (asset, vol) in AssetId::ALL.iter().zip(vols.iter()) {
                if !vol.is_finite() || *vol <= 0.0 {
                    return Err(KeeperError::InvalidConfig(format!(
                        "weights.default_vols for {}: expected a positive finite value, got {}",
                        asset, vol
                    )));
                }
            }
        }

        Ok(())
    }

    /// Weight bounds to run with: overrides when present, asset defaults
    /// otherwise
    pub fn weight_bounds(&self) -> [WeightBounds; ASSET_COUNT] {
        match &self.weights.bounds {
            Some(bounds) => {
                let mut out = [WeightBounds { min: 0.0, max: 1.0 }; ASSET_COUNT];
                for (slot, (min, max)) in out.iter_mut().zip(bounds.iter()) {
                    *slot = WeightBounds { min: *min, max: *max };
                }
                out
            }
            None => {
                let mut out = [WeightBounds { min: 0.0, max: 1.0 }; ASSET_COUNT];
                for asset in AssetId::ALL {
                    out[asset.index()] = asset.default_weight_bounds();
                }
                out
            }
        }
    }

    /// Smoothing factor to run with
    pub fn lambda(&self) -> f64 {
        self.weights.lambda.unwrap_or(SMOOTHING_LAMBDA)
    }

    /// Volatility priors to run with: overrides when present, asset
    /// defaults otherwise
    pub fn default_vols(&self) -> [f64; ASSET_COUNT] {
        self.weights
            .default_vols
            .unwrap_or_else(default_volatilities)
    }

    /// Construct the record this keeper hosts, with the update role
    /// already granted to the configured updater
    pub fn build_record(&self) -> KeeperResult<PriceRecord> {
        let record = PriceRecord::new(
            self.record.admin_id.as_str(),
            self.record.min_update_interval_secs,
            self.record.max_change_rate_bps,
        )?;
        record.grant_updater(&self.record.admin_id, &self.updater_id)?;
        Ok(record)
    }

    /// Construct the weight engine from the configured bounds and lambda
    pub fn build_engine(&self) -> KeeperResult<WeightEngine> {
        let engine = WeightEngine::with_bounds(self.weight_bounds(), self.lambda())?;
        Ok(engine)
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            updater_id: "bullion-keeper".to_string(),
            poll_interval_secs: 300,
            fetch_spacing_ms: default_fetch_spacing_ms(),
            stale_alert_secs: default_stale_alert_secs(),
            record: RecordConfig {
                admin_id: "bullion-admin".to_string(),
                min_update_interval_secs: 300,
                max_change_rate_bps: 500,
            },
            source: SourceConfig {
                base_url: "https://api.metals.example/v1".to_string(),
                api_key: String::new(),
                currency: default_currency(),
            },
            weights: WeightsConfig::default(),
        }
    }
}

fn default_fetch_spacing_ms() -> u64 {
    250
}

fn default_stale_alert_secs() -> i64 {
    1_800
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Create an example configuration file
pub fn create_example_config(path: &str) -> KeeperResult<()> {
    let mut example = KeeperConfig::default();
    example.source.api_key = "YOUR_API_KEY".to_string();
    example.save(path)?;
    Ok(())
}
