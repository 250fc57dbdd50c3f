// Instance Control Port
// Abstraction over the cloud control plane that stops the host

use async_trait::async_trait;
use thiserror::Error;

/// The host compute instance's own identity.
///
/// Resolved lazily at shutdown time via the metadata service, never cached
/// earlier: the monitor may run for hours before it needs this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub instance_id: String,
    pub region: String,
}

/// Shutdown errors
#[derive(Error, Debug)]
pub enum ShutdownError {
    #[error("Instance identity unavailable: {0}")]
    Identity(String),

    #[error("Stop command failed for {instance_id}: {reason}")]
    StopFailed { instance_id: String, reason: String },
}

/// Instance controller
///
/// Implementations issue the stop command exactly as asked; retry policy
/// belongs to the caller (the monitor deliberately has none).
#[async_trait]
pub trait InstanceController: Send + Sync {
    /// Resolve the host's own instance id and region via the metadata service
    async fn resolve_identity(&self) -> Result<HostIdentity, ShutdownError>;

    /// Issue a stop command for the given instance
    async fn stop(&self, identity: &HostIdentity) -> Result<(), ShutdownError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock controller behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Resolve and stop both succeed
        Success,
        /// Identity resolution fails with message
        FailResolve(String),
        /// Resolution succeeds, stop fails with message
        FailStop(String),
    }

    /// Mock instance controller with call counting
    pub struct MockInstanceController {
        behavior: Arc<Mutex<MockBehavior>>,
        resolve_count: Arc<Mutex<usize>>,
        stop_count: Arc<Mutex<usize>>,
        stopped: Arc<Mutex<Vec<HostIdentity>>>,
    }

    impl MockInstanceController {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                resolve_count: Arc::new(Mutex::new(0)),
                stop_count: Arc::new(Mutex::new(0)),
                stopped: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail_resolve(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailResolve(message.into()))
        }

        pub fn new_fail_stop(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailStop(message.into()))
        }

        pub fn resolve_count(&self) -> usize {
            *self.resolve_count.lock().unwrap()
        }

        pub fn stop_count(&self) -> usize {
            *self.stop_count.lock().unwrap()
        }

        /// Identities that received a successful stop command
        pub fn stopped_instances(&self) -> Vec<HostIdentity> {
            self.stopped.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InstanceController for MockInstanceController {
        async fn resolve_identity(&self) -> Result<HostIdentity, ShutdownError> {
            *self.resolve_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::FailResolve(msg) => Err(ShutdownError::Identity(msg)),
                _ => Ok(HostIdentity {
                    instance_id: "i-0123456789abcdef0".to_string(),
                    region: "us-east-1".to_string(),
                }),
            }
        }

        async fn stop(&self, identity: &HostIdentity) -> Result<(), ShutdownError> {
            *self.stop_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::FailStop(msg) => Err(ShutdownError::StopFailed {
                    instance_id: identity.instance_id.clone(),
                    reason: msg,
                }),
                _ => {
                    self.stopped.lock().unwrap().push(identity.clone());
                    Ok(())
                }
            }
        }
    }
}
