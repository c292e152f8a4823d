//! Upstream spot-price source
//!
//! The gateway talks to the upstream through the [`PriceSource`] trait so
//! tests can script a tape; production uses the HTTP implementation.

use serde::Deserialize;

use bullion_core::{AssetId, SpotQuote};

use crate::config::SourceConfig;
use crate::error::{KeeperError, KeeperResult};

/// Per-asset spot-price lookup
pub trait PriceSource {
    /// Fetch the current spot quote for one asset
    fn fetch(&self, asset: AssetId) -> impl std::future::Future<Output = KeeperResult<SpotQuote>> + Send;
}

/// HTTP spot-price source
///
/// Expects `GET {base_url}/spot/{symbol}?currency={currency}` to return a
/// JSON body with `price`, `symbol`, `currency` and a Unix `timestamp`.
pub struct HttpPriceSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    currency: String,
}

/// Wire shape of an upstream quote
#[derive(Debug, Deserialize)]
struct QuoteBody {
    price: f64,
    symbol: String,
    currency: String,
    timestamp: i64,
}

impl HttpPriceSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            currency: config.currency.clone(),
        }
    }
}

impl PriceSource for HttpPriceSource {
    async fn fetch(&self, asset: AssetId) -> KeeperResult<SpotQuote> {
        let symbol = asset.symbol();
        let url = format!("{}/spot/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("currency", self.currency.as_str())])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|source| KeeperError::UpstreamTransport {
                symbol: symbol.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KeeperError::UpstreamFetch {
                symbol: symbol.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: QuoteBody =
            response
                .json()
                .await
                .map_err(|source| KeeperError::UpstreamTransport {
                    symbol: symbol.to_string(),
                    source,
                })?;

        Ok(SpotQuote {
            symbol: body.symbol,
            currency: body.currency,
            price: body.price,
            timestamp: body.timestamp,
        })
    }
}
