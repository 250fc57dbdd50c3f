// Queue Depth Port
// Abstraction over the external work queue the monitor observes

use async_trait::async_trait;
use thiserror::Error;

/// Queue observation errors
#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("Queue backend unreachable: {0}")]
    Unreachable(String),

    #[error("Queue response malformed: {0}")]
    Malformed(String),
}

/// Queue depth source
///
/// The monitor observes the queue, it never owns it. Depth is the sum of
/// pending and in-progress items and is recomputed on every poll.
///
/// # Errors
/// A failed observation must never be read as "idle" by callers; the
/// monitor substitutes a busy depth (see the fail-safe in the sentinel).
#[async_trait]
pub trait QueueDepthSource: Send + Sync {
    /// Current total queue depth (pending + in progress)
    async fn depth(&self) -> Result<u64, ObservationError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// One scripted observation outcome
    #[derive(Debug, Clone)]
    pub enum DepthSample {
        Depth(u64),
        Unavailable,
    }

    /// Mock depth source replaying a scripted observation sequence
    pub struct MockQueueDepthSource {
        script: Arc<Mutex<VecDeque<DepthSample>>>,
        always_fail: bool,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockQueueDepthSource {
        pub fn from_script(samples: Vec<DepthSample>) -> Self {
            Self {
                script: Arc::new(Mutex::new(samples.into())),
                always_fail: false,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        /// Script of plain depths; reports zero once the script runs out.
        pub fn from_depths(depths: &[u64]) -> Self {
            Self::from_script(depths.iter().copied().map(DepthSample::Depth).collect())
        }

        /// Every observation fails, forever.
        pub fn always_failing() -> Self {
            Self {
                script: Arc::new(Mutex::new(VecDeque::new())),
                always_fail: true,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl QueueDepthSource for MockQueueDepthSource {
        async fn depth(&self) -> Result<u64, ObservationError> {
            *self.call_count.lock().unwrap() += 1;

            if self.always_fail {
                return Err(ObservationError::Unreachable(
                    "mock queue offline".to_string(),
                ));
            }

            match self.script.lock().unwrap().pop_front() {
                Some(DepthSample::Depth(depth)) => Ok(depth),
                Some(DepthSample::Unavailable) => Err(ObservationError::Unreachable(
                    "mock observation failure".to_string(),
                )),
                None => Ok(0),
            }
        }
    }
}
