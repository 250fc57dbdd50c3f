// Sentinel constants (no magic values)
use std::time::Duration;

/// Sustained zero-depth period required before the host is stopped (5 minutes)
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(300);

/// One-time grace delay before the first poll (60s)
///
/// Gives the sibling inference service time to finish loading model weights
/// before the monitor starts judging idleness.
pub const STARTUP_GRACE: Duration = Duration::from_secs(60);

/// Delay between queue-depth polls (60s)
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Depth substituted when an observation fails (fail-safe: assume busy)
pub const FAILED_OBSERVATION_DEPTH: u64 = 1;
