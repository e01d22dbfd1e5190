//! Snapshot debouncing
//!
//! The tuner redraws its screen field by field. A snapshot is only worth
//! sending once the writes have stopped for a while.

/// Quiet time before a changed screen is emitted
pub const DEFAULT_QUIESCENCE_MS: u32 = 100;

/// Tracks the last change and whether it has been emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettleTracker {
    window_ms: u32,
    last_dirty_ms: u32,
    published: bool,
}

impl SettleTracker {
    /// Starts out published so nothing is sent before the first change
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            last_dirty_ms: 0,
            published: true,
        }
    }

    /// Feed one tick; returns true when a snapshot should be emitted now
    ///
    /// `dirty` is the flag taken from the display memory on this tick.
    pub fn poll(&mut self, dirty: bool, now_ms: u32) -> bool {
        if dirty {
            self.last_dirty_ms = now_ms;
            self.published = false;
            return false;
        }
        if !self.published && now_ms.wrapping_sub(self.last_dirty_ms) > self.window_ms {
            self.published = true;
            return true;
        }
        false
    }
}

impl Default for SettleTracker {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_before_first_change() {
        let mut settle = SettleTracker::default();
        for now in 0..1000 {
            assert!(!settle.poll(false, now));
        }
    }

    #[test]
    fn test_emits_once_after_window() {
        let mut settle = SettleTracker::default();
        assert!(!settle.poll(true, 1000));
        // Exactly 100 ms is not enough
        assert!(!settle.poll(false, 1100));
        assert!(settle.poll(false, 1101));
        assert!(!settle.poll(false, 1102));
        assert!(!settle.poll(false, 5000));
    }

    #[test]
    fn test_burst_restarts_window() {
        let mut settle = SettleTracker::default();
        let mut emitted = 0;
        // A write every 50 ms for one second, then silence
        for now in 0..1300u32 {
            let dirty = now < 1000 && now % 50 == 0;
            if settle.poll(dirty, now) {
                emitted += 1;
                // Last write at 950
                assert_eq!(now, 1051);
            }
        }
        assert_eq!(emitted, 1);
    }

    #[test]
    fn test_timer_wraparound() {
        let mut settle = SettleTracker::new(100);
        assert!(!settle.poll(true, u32::MAX - 10));
        assert!(!settle.poll(false, 50));
        assert!(settle.poll(false, 90));
    }

    #[test]
    fn test_custom_window() {
        let mut settle = SettleTracker::new(5);
        settle.poll(true, 0);
        assert!(!settle.poll(false, 5));
        assert!(settle.poll(false, 6));
    }
}
