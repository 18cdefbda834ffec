//! Timestamp type and clock seam used throughout the service.
//!
//! Timestamps are Unix epoch seconds (UTC). Proposal deadlines are compared
//! at second granularity: a proposal is overdue once `now > deadline`,
//! never at `now == deadline`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs`, or `None` on overflow.
    pub fn checked_add_secs(&self, secs: u64) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether a deadline at this timestamp has passed relative to `now`.
    ///
    /// Strict: the second of the deadline itself still counts as open.
    pub fn is_past(&self, now: Timestamp) -> bool {
        now.0 > self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current instant.
///
/// Production code uses [`SystemClock`]; tests inject a deterministic clock
/// so time only moves when the test says so.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_open_through_its_own_second() {
        let deadline = Timestamp::new(1000);
        assert!(!deadline.is_past(Timestamp::new(999)));
        assert!(!deadline.is_past(Timestamp::new(1000)));
        assert!(deadline.is_past(Timestamp::new(1001)));
    }

    #[test]
    fn checked_add_overflow_is_none() {
        assert_eq!(Timestamp::new(u64::MAX).checked_add_secs(1), None);
        assert_eq!(
            Timestamp::new(100).checked_add_secs(50),
            Some(Timestamp::new(150))
        );
    }

    #[test]
    fn elapsed_saturates_for_future_timestamps() {
        let later = Timestamp::new(2000);
        assert_eq!(later.elapsed_since(Timestamp::new(1500)), 0);
        assert_eq!(Timestamp::new(1500).elapsed_since(later), 500);
    }

    #[test]
    fn serializes_as_plain_seconds() {
        let json = serde_json::to_string(&Timestamp::new(1700000000)).unwrap();
        assert_eq!(json, "1700000000");
    }
}
