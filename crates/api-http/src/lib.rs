//! HTTP API Layer
//!
//! Serves the generation endpoints over axum: liveness-gated health probe,
//! multipart image generation, and the queue-worker job contract.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, AppState};
pub use server::{serve, HttpServerConfig};
