//! # Bullion Keeper
//!
//! Off-chain publication service for the bullion index: fetches spot
//! prices for the basket, runs the signal processor from `bullion-core`,
//! and publishes admission-controlled updates into `bullion-record`.

pub mod config;
pub mod error;
pub mod gateway;
pub mod source;

pub use config::{create_example_config, KeeperConfig, RecordConfig, SourceConfig, WeightsConfig};
pub use error::{KeeperError, KeeperResult};
pub use gateway::{PublicationGateway, TickOutcome};
pub use source::{HttpPriceSource, PriceSource};
