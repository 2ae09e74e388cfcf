//! Slot counter for a single admission window.

use chrono::{DateTime, Utc};

/// Counts slots consumed in the current window.
///
/// The counter carries no synchronization of its own; the owning gate keeps it
/// behind a mutex so that a check-and-take and a reset never interleave.
#[derive(Debug)]
pub struct SlotCounter {
    /// Slots consumed in the current window
    used: u64,
    /// Maximum slots per window
    limit: u64,
    /// Slots granted over the counter's lifetime
    granted_total: u64,
    /// Number of window resets so far
    resets: u64,
    /// Wall-clock time of the last reset
    last_reset_at: Option<DateTime<Utc>>,
}

impl SlotCounter {
    /// Create a new counter with `limit` slots per window.
    pub fn new(limit: u64) -> Self {
        Self {
            used: 0,
            limit,
            granted_total: 0,
            resets: 0,
            last_reset_at: None,
        }
    }

    /// Take one slot if the window has capacity left.
    ///
    /// Returns `true` if a slot was consumed.
    pub fn try_take(&mut self) -> bool {
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        self.granted_total += 1;
        true
    }

    /// Start a new window.
    pub fn reset(&mut self) {
        self.used = 0;
        self.resets += 1;
        self.last_reset_at = Some(Utc::now());
    }

    /// Get the number of slots consumed in the current window.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Get the remaining slots in the current window.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    /// Get the number of slots granted over the counter's lifetime.
    pub fn granted_total(&self) -> u64 {
        self.granted_total
    }

    /// Get the number of window resets so far.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Get the wall-clock time of the last reset, if any.
    pub fn last_reset_at(&self) -> Option<DateTime<Utc>> {
        self.last_reset_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_within_limit() {
        let mut counter = SlotCounter::new(10);

        assert!(counter.try_take());
        assert_eq!(counter.used(), 1);
        assert_eq!(counter.remaining(), 9);
    }

    #[test]
    fn test_take_stops_at_limit() {
        let mut counter = SlotCounter::new(3);

        for _ in 0..3 {
            assert!(counter.try_take());
        }

        // The 4th take must not push the counter past the limit
        assert!(!counter.try_take());
        assert_eq!(counter.used(), 3);
        assert_eq!(counter.remaining(), 0);
        assert_eq!(counter.granted_total(), 3);
    }

    #[test]
    fn test_reset_restores_capacity() {
        let mut counter = SlotCounter::new(2);
        counter.try_take();
        counter.try_take();
        assert!(counter.last_reset_at().is_none());

        counter.reset();

        assert_eq!(counter.used(), 0);
        assert_eq!(counter.resets(), 1);
        assert!(counter.last_reset_at().is_some());
        assert!(counter.try_take());
        assert_eq!(counter.used(), 1);
        assert_eq!(counter.granted_total(), 3);
    }
}
