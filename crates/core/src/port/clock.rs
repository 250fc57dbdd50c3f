// Clock Port (for testability)

use async_trait::async_trait;
use std::time::Duration;

/// Clock interface covering both reading time and suspending on it.
///
/// Sleeping goes through the port so a test clock can advance its own time
/// instead of parking the runtime; the monitor loop runs instantly under a
/// fake clock with no real sleeps or timers.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Suspend the calling task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// System clock (production)
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    /// Fake clock whose `sleep` advances its own timestamp and returns
    /// immediately.
    ///
    /// An optional sleep budget bounds otherwise-endless loops: once the
    /// budget is spent, `sleep` pends forever, so a test can wrap the loop
    /// in a short real-time timeout and then inspect call counts.
    pub struct FakeClock {
        now_ms: Arc<AtomicI64>,
        sleep_log: Arc<Mutex<Vec<Duration>>>,
        sleep_budget: Arc<Mutex<Option<usize>>>,
    }

    impl FakeClock {
        pub fn new(start_ms: i64) -> Self {
            Self {
                now_ms: Arc::new(AtomicI64::new(start_ms)),
                sleep_log: Arc::new(Mutex::new(Vec::new())),
                sleep_budget: Arc::new(Mutex::new(None)),
            }
        }

        /// Fake clock that parks forever on the sleep after `budget` calls.
        pub fn with_sleep_budget(start_ms: i64, budget: usize) -> Self {
            let clock = Self::new(start_ms);
            *clock.sleep_budget.lock().unwrap() = Some(budget);
            clock
        }

        /// Durations passed to `sleep`, in call order.
        pub fn sleep_log(&self) -> Vec<Duration> {
            self.sleep_log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now_millis(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }

        async fn sleep(&self, duration: Duration) {
            let exhausted = {
                let mut budget = self.sleep_budget.lock().unwrap();
                match budget.as_mut() {
                    Some(0) => true,
                    Some(remaining) => {
                        *remaining -= 1;
                        false
                    }
                    None => false,
                }
            };
            if exhausted {
                std::future::pending::<()>().await;
            }
            self.sleep_log.lock().unwrap().push(duration);
            self.now_ms
                .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
        }
    }
}
