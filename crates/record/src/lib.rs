//! # Bullion Record - Authoritative Index Price Record
//!
//! Tamper-resistant record of the published bullion index. Every update
//! passes a strict admission-control pipeline (authorization, positivity,
//! rate limit, magnitude bound) and commits atomically or not at all.
//! Reads are unauthenticated; writes are gated on an explicit role set.

pub mod error;
pub mod events;
pub mod record;

pub use error::{RecordError, RecordResult};
pub use events::RecordEvent;
pub use record::{ConstituentPrices, PriceRecord, PriceReading};
