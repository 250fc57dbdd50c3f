// Application Layer - Use Cases and Business Logic

pub mod art;
pub mod edge;
pub mod job;
pub mod sentinel;

// Re-exports
pub use art::ArtService;
pub use job::{JobOutput, JobRunner};
pub use sentinel::{IdleMonitor, MonitorConfig, MonitorState};
