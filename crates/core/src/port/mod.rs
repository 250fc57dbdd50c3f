// Port Layer - Interfaces for external dependencies

pub mod clock;
pub mod instance;
pub mod pipeline;
pub mod queue;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use instance::{HostIdentity, InstanceController, ShutdownError};
pub use pipeline::{GenerationPipeline, GenerationRequest, PipelineError};
pub use queue::{ObservationError, QueueDepthSource};
