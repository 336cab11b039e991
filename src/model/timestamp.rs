//! Wall-clock timestamp used throughout the data model
//!
//! A thin newtype over seconds-since-epoch. Kept separate from
//! `std::time::SystemTime` so zero has an unambiguous "never set" meaning
//! for the monotonic-merge rules in spec §4.9 (a `SystemTime` has no such
//! sentinel).

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch. Zero means "never set".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The zero / "never set" sentinel
    pub const ZERO: Timestamp = Timestamp(0);

    /// Builds a timestamp from raw epoch seconds
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Captures the current wall-clock time
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(secs)
    }

    /// Returns true if this is the zero sentinel
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Raw epoch seconds
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns true if `self` is older than `now - interval_secs`, or the
    /// sentinel zero (spec §4.4 rescan filters: "a zero LastScan also
    /// admits the device for first scan").
    pub fn is_stale(&self, now: Timestamp, interval_secs: u64) -> bool {
        self.is_zero() || now.0.saturating_sub(self.0) >= interval_secs
    }
}

#[cfg(test)]
#[path = "./timestamp_tests.rs"]
mod tests;
