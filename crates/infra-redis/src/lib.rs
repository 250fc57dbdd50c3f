// Atelier Infrastructure - Redis Queue Adapters
// Implements: QueueDepthSource

pub mod queue_depth;

pub use queue_depth::RedisQueueDepthSource;
