//! Error types for the keeper service

use thiserror::Error;

use bullion_record::RecordError;

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("upstream fetch failed for {symbol}: status {status}: {body}")]
    UpstreamFetch {
        symbol: String,
        status: u16,
        body: String,
    },

    #[error("upstream transport error for {symbol}: {source}")]
    UpstreamTransport {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("record error: {0}")]
    Record(#[from] RecordError),

    #[error("computation error: {0}")]
    Computation(#[from] bullion_core::CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type KeeperResult<T> = Result<T, KeeperError>;
