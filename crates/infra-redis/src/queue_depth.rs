// Queue depth observation over Redis
// reason: the job broker keeps its backlog in Redis lists; LLEN is all we need
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::debug;

use atelier_core::port::queue::{ObservationError, QueueDepthSource};

/// How long a single poll may spend connecting or waiting on a reply.
/// A slow broker is indistinguishable from a dead one for our purposes;
/// the caller treats either as a failed observation.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Queue depth source backed by the broker's Redis lists.
///
/// The broker keeps pending jobs in `<queue>:wait` and in-flight jobs in
/// `<queue>:active`; total depth is the sum of both list lengths. A missing
/// key reads as an empty list, so a queue that has never seen a job
/// reports depth zero.
///
/// Connections are made per poll. Polls are a minute apart, and a fresh
/// connection keeps a broker outage scoped to the observation that hit it
/// instead of wedging a long-lived connection.
pub struct RedisQueueDepthSource {
    client: redis::Client,
    wait_key: String,
    active_key: String,
}

impl RedisQueueDepthSource {
    /// Point at the broker. No connection is made until the first poll.
    pub fn new(host: &str, port: u16, queue_name: &str) -> Result<Self, ObservationError> {
        let url = format!("redis://{host}:{port}/");
        let client = redis::Client::open(url.as_str())
            .map_err(|e| ObservationError::Unreachable(e.to_string()))?;
        let (wait_key, active_key) = queue_keys(queue_name);

        Ok(Self {
            client,
            wait_key,
            active_key,
        })
    }
}

/// Derive the broker's list keys for a queue name.
fn queue_keys(queue_name: &str) -> (String, String) {
    (
        format!("{queue_name}:wait"),
        format!("{queue_name}:active"),
    )
}

fn map_command_error(e: redis::RedisError) -> ObservationError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_timeout() {
        ObservationError::Unreachable(e.to_string())
    } else {
        ObservationError::Malformed(e.to_string())
    }
}

#[async_trait]
impl QueueDepthSource for RedisQueueDepthSource {
    async fn depth(&self) -> Result<u64, ObservationError> {
        let mut connection = self
            .client
            .get_multiplexed_async_connection_with_timeouts(RESPONSE_TIMEOUT, CONNECT_TIMEOUT)
            .await
            .map_err(|e| ObservationError::Unreachable(e.to_string()))?;

        let waiting: u64 = connection
            .llen(&self.wait_key)
            .await
            .map_err(map_command_error)?;
        let active: u64 = connection
            .llen(&self.active_key)
            .await
            .map_err(map_command_error)?;

        debug!(waiting, active, "Queue lists measured");

        Ok(waiting + active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_keys_follow_broker_naming() {
        let (wait, active) = queue_keys("art-generation-queue");

        assert_eq!(wait, "art-generation-queue:wait");
        assert_eq!(active, "art-generation-queue:active");
    }

    #[test]
    fn source_builds_without_a_live_broker() {
        let source = RedisQueueDepthSource::new("127.0.0.1", 6379, "art-generation-queue");
        assert!(source.is_ok());
    }

    #[tokio::test]
    async fn unreachable_broker_reports_observation_failure() {
        // Port 1 is never a Redis server; the poll must fail cleanly.
        let source = RedisQueueDepthSource::new("127.0.0.1", 1, "art-generation-queue").unwrap();

        let outcome = source.depth().await;
        assert!(matches!(outcome, Err(ObservationError::Unreachable(_))));
    }
}
