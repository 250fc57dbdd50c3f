// Idle Shutdown Sentinel - queue-watching control loop

pub mod constants;

use constants::*;

use crate::domain::IdleWindow;
use crate::port::{Clock, InstanceController, QueueDepthSource, ShutdownError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Monitor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Startup,
    Monitoring,
    ShuttingDown,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Startup => write!(f, "STARTUP"),
            MonitorState::Monitoring => write!(f, "MONITORING"),
            MonitorState::ShuttingDown => write!(f, "SHUTTING_DOWN"),
        }
    }
}

/// Monitor timing configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub idle_threshold: Duration,
    pub startup_grace: Duration,
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            idle_threshold: IDLE_THRESHOLD,
            startup_grace: STARTUP_GRACE,
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Idle shutdown monitor
///
/// Three-state control loop: wait out the startup grace, poll queue depth
/// at a fixed interval, stop the host once the queue has been idle past the
/// threshold. `run` consumes the monitor, so one process can never issue
/// more than one stop attempt.
pub struct IdleMonitor {
    clock: Arc<dyn Clock>,
    depth_source: Arc<dyn QueueDepthSource>,
    instances: Arc<dyn InstanceController>,
    config: MonitorConfig,
    state: MonitorState,
    window: IdleWindow,
}

impl IdleMonitor {
    pub fn new(
        clock: Arc<dyn Clock>,
        depth_source: Arc<dyn QueueDepthSource>,
        instances: Arc<dyn InstanceController>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            clock,
            depth_source,
            instances,
            config,
            state: MonitorState::Startup,
            window: IdleWindow::new(),
        }
    }

    /// Run the monitor to completion.
    ///
    /// Returns once a stop command has been attempted, successfully or not.
    /// A failed stop is not retried: a monitor stuck retrying shutdown
    /// burns the very compute it exists to reclaim. The caller decides how
    /// to log the outcome and exit.
    pub async fn run(mut self) -> Result<(), ShutdownError> {
        loop {
            match self.state {
                MonitorState::Startup => {
                    info!(
                        grace_secs = self.config.startup_grace.as_secs(),
                        "Waiting out startup grace period"
                    );
                    self.clock.sleep(self.config.startup_grace).await;
                    self.transition(MonitorState::Monitoring);
                }
                MonitorState::Monitoring => {
                    let depth = self.observe_depth().await;
                    let now = self.clock.now_millis();
                    self.window.observe(depth, now);

                    if self.window.has_expired(now, self.config.idle_threshold) {
                        self.transition(MonitorState::ShuttingDown);
                    } else {
                        self.clock.sleep(self.config.poll_interval).await;
                    }
                }
                MonitorState::ShuttingDown => {
                    return self.stop_host().await;
                }
            }
        }
    }

    /// Poll the queue, substituting a busy depth when the observation fails.
    ///
    /// A failed observation must never read as idle: jobs may be in flight
    /// while the queue backend is briefly unreachable.
    async fn observe_depth(&self) -> u64 {
        match self.depth_source.depth().await {
            Ok(depth) => {
                debug!(depth, "Queue depth observed");
                depth
            }
            Err(e) => {
                warn!(
                    error = %e,
                    assumed_depth = FAILED_OBSERVATION_DEPTH,
                    "Queue depth observation failed, assuming busy"
                );
                FAILED_OBSERVATION_DEPTH
            }
        }
    }

    /// Resolve the host's identity and issue the stop command.
    async fn stop_host(&self) -> Result<(), ShutdownError> {
        let identity = self.instances.resolve_identity().await?;
        info!(
            instance_id = %identity.instance_id,
            region = %identity.region,
            idle_secs = self.config.idle_threshold.as_secs(),
            "Queue idle past threshold, stopping instance"
        );
        self.instances.stop(&identity).await?;
        info!("Stop command issued, monitor exiting");
        Ok(())
    }

    fn transition(&mut self, next: MonitorState) {
        info!(from = %self.state, to = %next, "Monitor state transition");
        self.state = next;
    }
}
