//! Event definitions
//!
//! State-change notifications pushed by the record and drained by its
//! host process. The non-ledger stand-in for emitted chain events.

use serde::{Deserialize, Serialize};

/// Event emitted on every committed state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordEvent {
    /// A proposed price was accepted and committed
    PriceUpdated {
        price: u64,
        timestamp: i64,
        updater: String,
    },

    /// A constituent snapshot was recorded alongside an accepted price
    ConstituentsRecorded {
        gold: u64,
        silver: u64,
        platinum: u64,
        palladium: u64,
        timestamp: i64,
    },

    /// The minimum update interval was reconfigured
    MinIntervalChanged { old: i64, new: i64 },

    /// The maximum change rate was reconfigured
    MaxChangeRateChanged { old: u32, new: u32 },
}
