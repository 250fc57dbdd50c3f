// Domain Layer - Pure business logic and entities

pub mod art;
pub mod error;
pub mod idle;

// Re-exports
pub use art::{ArtRequest, InferenceSettings};
pub use error::DomainError;
pub use idle::IdleWindow;
