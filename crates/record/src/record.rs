//! # Price Record
//!
//! The authoritative, admission-controlled record of the published index.
//! Validation runs in a strict order (authorization, positivity, rate
//! limit, magnitude bound) and the commit is all-or-nothing: a rejected
//! proposal leaves every field exactly as it was.
//!
//! All state sits behind one mutex and every operation is a single lock
//! scope, so concurrent proposers serialize; the loser of a race observes
//! `RateLimited` on its next attempt.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use bullion_core::constants::{BPS_DENOMINATOR, PRICE_DECIMALS};

use crate::error::{RecordError, RecordResult};
use crate::events::RecordEvent;

/// Constituent prices supplied alongside a proposed index value, all at
/// the fixed 10^6 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituentPrices {
    pub gold: u64,
    pub silver: u64,
    pub platinum: u64,
    pub palladium: u64,
    /// Timestamp of the accepted update that carried this snapshot
    pub timestamp: i64,
}

/// Price plus provenance, returned by the unauthenticated read surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    /// Last accepted price at the fixed scale
    pub price: u64,
    /// Timestamp of the last accepted update (0 = never updated)
    pub last_update: i64,
    /// Fixed decimal scale, always 6
    pub decimals: u32,
}

/// Mutable record state; only reachable through the mutex
#[derive(Debug)]
struct RecordState {
    /// Last accepted price, fixed scale. Meaningless until live.
    price: u64,
    /// 0 while uninitialized; set on the first accepted update
    last_update: i64,
    /// Minimum seconds between accepted updates (0 disables the check)
    min_update_interval: i64,
    /// Largest accepted move relative to the stored price, basis points
    max_change_rate_bps: u32,
    /// Identity holding the administrative role
    admin: String,
    /// Identities holding the update role
    updaters: HashSet<String>,
    /// Last-known constituent snapshot
    constituents: Option<ConstituentPrices>,
    /// Pending events, drained by the host
    events: Vec<RecordEvent>,
}

/// Authoritative index price record with admission control
#[derive(Debug)]
pub struct PriceRecord {
    inner: Mutex<RecordState>,
}

impl PriceRecord {
    /// Create an uninitialized record owned by `admin`.
    ///
    /// `max_change_rate_bps` must lie in (0, 10000]; `min_update_interval`
    /// accepts any non-negative value (negative inputs are clamped to 0).
    pub fn new(
        admin: impl Into<String>,
        min_update_interval: i64,
        max_change_rate_bps: u32,
    ) -> RecordResult<Self> {
        validate_change_rate(max_change_rate_bps)?;
        Ok(Self {
            inner: Mutex::new(RecordState {
                price: 0,
                last_update: 0,
                min_update_interval: min_update_interval.max(0),
                max_change_rate_bps,
                admin: admin.into(),
                updaters: HashSet::new(),
                constituents: None,
                events: Vec::new(),
            }),
        })
    }

    // ========================================================================
    // Write surface (update role)
    // ========================================================================

    /// Propose a new index price
    pub fn set_price(&self, caller: &str, price: u64, now: i64) -> RecordResult<()> {
        self.propose(caller, price, None, now)
    }

    /// Propose a new index price together with its constituent snapshot
    pub fn set_price_with_constituents(
        &self,
        caller: &str,
        price: u64,
        constituents: ConstituentPrices,
        now: i64,
    ) -> RecordResult<()> {
        self.propose(caller, price, Some(constituents), now)
    }

    /// Admission-control pipeline. Checks run in a fixed order against a
    /// consistent state snapshot; the commit happens only after every
    /// check passes.
    fn propose(
        &self,
        caller: &str,
        price: u64,
        constituents: Option<ConstituentPrices>,
        now: i64,
    ) -> RecordResult<()> {
        let mut state = self.lock();

        // 1. Authorization
        if !state.updaters.contains(caller) {
            return Err(RecordError::Unauthorized);
        }

        // 2. Positivity
        if price == 0 {
            return Err(RecordError::InvalidPrice);
        }

        let live = state.last_update > 0;

        // 3. Anti-spam: skipped until the first accepted update
        if live && state.min_update_interval > 0 && now < state.last_update + state.min_update_interval
        {
            return Err(RecordError::RateLimited);
        }

        // 4. Magnitude bound, integer math at the fixed scale
        if live {
            let max_delta =
                (state.price as u128 * state.max_change_rate_bps as u128) / BPS_DENOMINATOR as u128;
            if price.abs_diff(state.price) as u128 > max_delta {
                return Err(RecordError::ChangeExceedsBound);
            }
        }

        // 5. Commit
        state.price = price;
        state.last_update = now;
        state.events.push(RecordEvent::PriceUpdated {
            price,
            timestamp: now,
            updater: caller.to_string(),
        });
        if let Some(mut snapshot) = constituents {
            snapshot.timestamp = now;
            state.constituents = Some(snapshot);
            state.events.push(RecordEvent::ConstituentsRecorded {
                gold: snapshot.gold,
                silver: snapshot.silver,
                platinum: snapshot.platinum,
                palladium: snapshot.palladium,
                timestamp: now,
            });
        }

        Ok(())
    }

    // ========================================================================
    // Administrative surface (admin role)
    // ========================================================================

    /// Grant the update role to an identity
    pub fn grant_updater(&self, caller: &str, updater: &str) -> RecordResult<()> {
        let mut state = self.lock();
        state.require_admin(caller)?;
        state.updaters.insert(updater.to_string());
        Ok(())
    }

    /// Revoke the update role from an identity
    pub fn revoke_updater(&self, caller: &str, updater: &str) -> RecordResult<()> {
        let mut state = self.lock();
        state.require_admin(caller)?;
        state.updaters.remove(updater);
        Ok(())
    }

    /// Set the minimum interval between accepted updates
    pub fn set_min_update_interval(&self, caller: &str, interval_secs: i64) -> RecordResult<()> {
        let mut state = self.lock();
        state.require_admin(caller)?;
        let old = state.min_update_interval;
        state.min_update_interval = interval_secs.max(0);
        let new = state.min_update_interval;
        state.events.push(RecordEvent::MinIntervalChanged { old, new });
        Ok(())
    }

    /// Set the maximum accepted change rate in basis points, (0, 10000]
    pub fn set_max_change_rate(&self, caller: &str, bps: u32) -> RecordResult<()> {
        let mut state = self.lock();
        state.require_admin(caller)?;
        validate_change_rate(bps)?;
        let old = state.max_change_rate_bps;
        state.max_change_rate_bps = bps;
        state.events.push(RecordEvent::MaxChangeRateChanged { old, new: bps });
        Ok(())
    }

    // ========================================================================
    // Read surface (unauthenticated)
    // ========================================================================

    /// Last accepted price at the fixed scale (0 until live)
    pub fn price(&self) -> u64 {
        self.lock().price
    }

    /// Price with timestamp and decimal scale
    pub fn reading(&self) -> PriceReading {
        let state = self.lock();
        PriceReading {
            price: state.price,
            last_update: state.last_update,
            decimals: PRICE_DECIMALS,
        }
    }

    /// Last-known constituent snapshot
    pub fn constituents(&self) -> Option<ConstituentPrices> {
        self.lock().constituents
    }

    /// True when never updated, otherwise `now > last_update + max_age`
    pub fn is_stale(&self, now: i64, max_age: i64) -> bool {
        let state = self.lock();
        if state.last_update == 0 {
            return true;
        }
        now > state.last_update + max_age
    }

    /// Whether an identity currently holds the update role
    pub fn is_updater(&self, identity: &str) -> bool {
        self.lock().updaters.contains(identity)
    }

    /// Currently configured minimum update interval in seconds
    pub fn min_update_interval(&self) -> i64 {
        self.lock().min_update_interval
    }

    /// Currently configured maximum change rate in basis points
    pub fn max_change_rate_bps(&self) -> u32 {
        self.lock().max_change_rate_bps
    }

    /// Drain pending state-change events in commit order
    pub fn drain_events(&self) -> Vec<RecordEvent> {
        std::mem::take(&mut self.lock().events)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordState> {
        // Poisoning only occurs if a panic escaped a lock scope; the state
        // is still consistent because every mutation commits atomically
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordState {
    fn require_admin(&self, caller: &str) -> RecordResult<()> {
        if self.admin != caller {
            return Err(RecordError::Unauthorized);
        }
        Ok(())
    }
}

fn validate_change_rate(bps: u32) -> RecordResult<()> {
    if bps == 0 || bps > BPS_DENOMINATOR as u32 {
        return Err(RecordError::InvalidChangeRate(bps));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const ADMIN: &str = "admin";
    const UPDATER: &str = "keeper-1";

    fn live_record() -> PriceRecord {
        let record = PriceRecord::new(ADMIN, 300, 500).unwrap();
        record.grant_updater(ADMIN, UPDATER).unwrap();
        record.set_price(UPDATER, 2_500_000_000, 1_000).unwrap();
        record
    }

    fn constituents() -> ConstituentPrices {
        ConstituentPrices {
            gold: 2_400_000_000,
            silver: 29_000_000,
            platinum: 950_000_000,
            palladium: 1_020_000_000,
            timestamp: 0,
        }
    }

    #[test]
    fn test_first_update_skips_rate_and_magnitude_checks() {
        let record = PriceRecord::new(ADMIN, 300, 500).unwrap();
        record.grant_updater(ADMIN, UPDATER).unwrap();

        // Arbitrary first price at t=5, well inside any interval window
        record.set_price(UPDATER, 123_456_789, 5).unwrap();
        assert_eq!(record.price(), 123_456_789);
        assert_eq!(record.reading().last_update, 5);
    }

    #[test]
    fn test_unauthorized_caller_rejected() {
        let record = live_record();
        let before = record.reading();

        assert_eq!(
            record.set_price("stranger", 2_500_000_001, 2_000),
            Err(RecordError::Unauthorized)
        );
        // Admin role does not imply update role
        assert_eq!(
            record.set_price(ADMIN, 2_500_000_001, 2_000),
            Err(RecordError::Unauthorized)
        );
        assert_eq!(record.reading(), before);
    }

    #[test]
    fn test_zero_price_rejected() {
        let record = live_record();
        assert_eq!(
            record.set_price(UPDATER, 0, 2_000),
            Err(RecordError::InvalidPrice)
        );
    }

    #[test]
    fn test_rate_limit_boundary() {
        let record = live_record(); // live at t=1000, interval 300

        // One second early: rejected
        assert_eq!(
            record.set_price(UPDATER, 2_500_000_000, 1_299),
            Err(RecordError::RateLimited)
        );
        // Exactly at last_update + interval: accepted
        record.set_price(UPDATER, 2_500_000_000, 1_300).unwrap();
        assert_eq!(record.reading().last_update, 1_300);
    }

    #[test]
    fn test_zero_interval_disables_rate_limit() {
        let record = PriceRecord::new(ADMIN, 0, 500).unwrap();
        record.grant_updater(ADMIN, UPDATER).unwrap();
        record.set_price(UPDATER, 1_000_000, 100).unwrap();
        record.set_price(UPDATER, 1_000_001, 100).unwrap();
        assert_eq!(record.price(), 1_000_001);
    }

    #[test]
    fn test_magnitude_boundary() {
        let record = live_record(); // price 2_500_000_000, 500 bps bound
        let max_delta = 2_500_000_000u64 * 500 / 10_000; // 125_000_000

        // Exactly at the bound, both directions: accepted
        record
            .set_price(UPDATER, 2_500_000_000 + max_delta, 1_300)
            .unwrap();
        record
            .set_price(UPDATER, 2_625_000_000 - 2_625_000_000 * 500 / 10_000, 1_600)
            .unwrap();

        // One smallest unit past the bound: rejected
        let price = record.price();
        let limit = price * 500 / 10_000;
        assert_eq!(
            record.set_price(UPDATER, price + limit + 1, 1_900),
            Err(RecordError::ChangeExceedsBound)
        );
        // And the bound itself still passes afterwards
        record.set_price(UPDATER, price + limit, 1_900).unwrap();
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let record = live_record();
        record
            .set_price_with_constituents(UPDATER, 2_500_000_000, constituents(), 1_300)
            .unwrap();
        let before_reading = record.reading();
        let before_constituents = record.constituents();
        record.drain_events();

        // Violates the magnitude bound
        assert_eq!(
            record.set_price_with_constituents(UPDATER, 5_000_000_000, constituents(), 1_600),
            Err(RecordError::ChangeExceedsBound)
        );

        assert_eq!(record.reading(), before_reading);
        assert_eq!(record.constituents(), before_constituents);
        assert!(record.drain_events().is_empty());
    }

    #[test]
    fn test_constituents_snapshot_commits_with_price() {
        let record = live_record();
        record
            .set_price_with_constituents(UPDATER, 2_510_000_000, constituents(), 1_300)
            .unwrap();

        let snapshot = record.constituents().unwrap();
        assert_eq!(snapshot.gold, 2_400_000_000);
        assert_eq!(snapshot.palladium, 1_020_000_000);
        // Snapshot timestamp follows the accepted update, not the caller's
        assert_eq!(snapshot.timestamp, 1_300);
    }

    #[test]
    fn test_events_in_commit_order() {
        let record = live_record();
        record.drain_events();

        record
            .set_price_with_constituents(UPDATER, 2_510_000_000, constituents(), 1_300)
            .unwrap();
        record.set_min_update_interval(ADMIN, 600).unwrap();
        assert_eq!(record.min_update_interval(), 600);

        let events = record.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            RecordEvent::PriceUpdated {
                price: 2_510_000_000,
                timestamp: 1_300,
                updater: UPDATER.to_string(),
            }
        );
        assert!(matches!(events[1], RecordEvent::ConstituentsRecorded { .. }));
        assert_eq!(events[2], RecordEvent::MinIntervalChanged { old: 300, new: 600 });

        // Drained means drained
        assert!(record.drain_events().is_empty());
    }

    #[test]
    fn test_admin_surface_gated() {
        let record = live_record();
        assert_eq!(
            record.grant_updater(UPDATER, "other"),
            Err(RecordError::Unauthorized)
        );
        assert_eq!(
            record.set_min_update_interval(UPDATER, 60),
            Err(RecordError::Unauthorized)
        );
        assert_eq!(
            record.set_max_change_rate(UPDATER, 100),
            Err(RecordError::Unauthorized)
        );
    }

    #[test]
    fn test_revoked_updater_loses_access() {
        let record = live_record();
        assert!(record.is_updater(UPDATER));
        record.revoke_updater(ADMIN, UPDATER).unwrap();
        assert!(!record.is_updater(UPDATER));
        assert_eq!(
            record.set_price(UPDATER, 2_500_000_000, 1_300),
            Err(RecordError::Unauthorized)
        );
    }

    #[test]
    fn test_change_rate_range_enforced() {
        let record = live_record();
        assert_eq!(
            record.set_max_change_rate(ADMIN, 0),
            Err(RecordError::InvalidChangeRate(0))
        );
        assert_eq!(
            record.set_max_change_rate(ADMIN, 10_001),
            Err(RecordError::InvalidChangeRate(10_001))
        );
        record.set_max_change_rate(ADMIN, 10_000).unwrap();
        assert_eq!(record.max_change_rate_bps(), 10_000);

        assert!(PriceRecord::new(ADMIN, 0, 0).is_err());
    }

    #[test]
    fn test_is_stale() {
        let record = PriceRecord::new(ADMIN, 300, 500).unwrap();
        // Never updated: stale regardless of age
        assert!(record.is_stale(0, 1_000_000));

        record.grant_updater(ADMIN, UPDATER).unwrap();
        record.set_price(UPDATER, 1_000_000, 1_000).unwrap();
        assert!(!record.is_stale(1_900, 900));
        assert!(record.is_stale(1_901, 900));
    }

    proptest::proptest! {
        /// Under any proposal sequence the record's invariants hold after
        /// every call: accepted updates respect the magnitude bound
        /// relative to the previously stored price and never arrive inside
        /// the minimum interval; rejected ones change nothing.
        #[test]
        fn prop_admission_invariants(
            proposals in proptest::collection::vec((1u64..10_000_000_000, 0i64..100_000), 1..50)
        ) {
            let record = PriceRecord::new(ADMIN, 300, 500).unwrap();
            record.grant_updater(ADMIN, UPDATER).unwrap();

            let mut clock = 0i64;
            for (price, advance) in proposals {
                clock += advance;
                let before = record.reading();
                let live = before.last_update > 0;

                match record.set_price(UPDATER, price, clock) {
                    Ok(()) => {
                        if live {
                            proptest::prop_assert!(clock >= before.last_update + 300);
                            let max_delta =
                                (before.price as u128 * 500) / BPS_DENOMINATOR as u128;
                            proptest::prop_assert!(
                                price.abs_diff(before.price) as u128 <= max_delta
                            );
                        }
                        proptest::prop_assert_eq!(record.price(), price);
                        proptest::prop_assert_eq!(record.reading().last_update, clock);
                    }
                    Err(_) => {
                        proptest::prop_assert_eq!(record.reading(), before);
                    }
                }
            }
        }
    }

    #[test]
    fn test_concurrent_proposers_serialize() {
        let record = Arc::new(live_record());

        // Two proposers race for the same admission window; the mutex
        // serializes them, so exactly one commits and the other is rate
        // limited
        let handles: Vec<_> = (0..2u64)
            .map(|i| {
                let record = Arc::clone(&record);
                std::thread::spawn(move || {
                    record.set_price(UPDATER, 2_500_000_000 + i, 1_300)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let limited = results
            .iter()
            .filter(|r| **r == Err(RecordError::RateLimited))
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(limited, 1);
    }
}
