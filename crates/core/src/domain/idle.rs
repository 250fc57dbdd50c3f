// Idle Window - pure bookkeeping for the shutdown monitor

use std::time::Duration;

/// Tracks the start of the current uninterrupted zero-depth period.
///
/// The window is cleared whenever the queue is observed busy and established
/// at the first zero observation that follows. Pure arithmetic over injected
/// timestamps; the monitor loop owns the clock.
///
/// Lives only in process memory. A restart re-establishes a fresh window,
/// which is acceptable: the cost is one extra idle threshold before shutdown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdleWindow {
    idle_since: Option<i64>,
}

impl IdleWindow {
    pub fn new() -> Self {
        Self { idle_since: None }
    }

    /// Record one depth observation taken at `now_millis`.
    ///
    /// A busy observation (depth > 0) discards the window; the idle period
    /// restarts from the next zero observation. A zero observation starts
    /// the window if none is open and otherwise leaves its start untouched.
    pub fn observe(&mut self, depth: u64, now_millis: i64) {
        if depth > 0 {
            self.idle_since = None;
        } else if self.idle_since.is_none() {
            self.idle_since = Some(now_millis);
        }
    }

    /// Whether the queue has been idle for at least `threshold` as of `now_millis`.
    ///
    /// Always false while no window is open (queue busy or never observed).
    pub fn has_expired(&self, now_millis: i64, threshold: Duration) -> bool {
        match self.idle_since {
            Some(start) => now_millis - start >= threshold.as_millis() as i64,
            None => false,
        }
    }

    /// Timestamp of the first zero observation in the current window, if open.
    pub fn idle_since(&self) -> Option<i64> {
        self.idle_since
    }
}
