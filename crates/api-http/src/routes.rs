//! Route Handlers
//!
//! Three routes: the health probe, the browser-facing multipart endpoint,
//! and the queue-worker job contract mounted over HTTP.

use crate::error::ApiError;
use atelier_core::application::{ArtService, JobRunner};
use atelier_core::domain::ArtRequest;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Uploads can carry full-resolution photos; cap request bodies at 32 MiB.
const BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Shared handler state, wired once before the listener binds.
#[derive(Clone)]
pub struct AppState {
    pub art: Arc<ArtService>,
    pub jobs: Arc<JobRunner>,
}

impl AppState {
    pub fn new(art: Arc<ArtService>) -> Self {
        Self {
            jobs: Arc::new(JobRunner::new(art.clone())),
            art,
        }
    }
}

/// Assemble the router.
///
/// The process binds this only after the pipeline reports ready, so a
/// passing health probe also means model weights are loaded.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate-art", post(generate_art))
        .route("/run", post(run_job))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Multipart generation: fields `image` (file), `prompt`, `negative_prompt`.
/// Replies with the rendered PNG bytes.
async fn generate_art(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut prompt = None;
    let mut negative_prompt = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        // name() borrows from the field, which text()/bytes() consume
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("prompt") => {
                prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Multipart(e.to_string()))?,
                );
            }
            Some("negative_prompt") => {
                negative_prompt = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Multipart(e.to_string()))?,
                );
            }
            Some("image") => {
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Multipart(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let prompt = prompt.ok_or(ApiError::MissingField("prompt"))?;
    let negative_prompt = negative_prompt.ok_or(ApiError::MissingField("negative_prompt"))?;
    let image = image.ok_or(ApiError::MissingField("image"))?;

    let request_id = Uuid::new_v4();
    info!(%request_id, image_bytes = image.len(), "Generation request received");

    let request = ArtRequest::new(prompt, negative_prompt, image.to_vec());
    let png = state.art.render(&request).await?;

    info!(%request_id, png_bytes = png.len(), "Generation request served");

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Queue-worker invocation path mounted over HTTP.
///
/// Validation failures are part of the job contract and come back as 200
/// with a structured error body, the same shape a queue worker returns.
async fn run_job(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let output = state.jobs.handle(&input).await?;
    let body = serde_json::to_value(output)
        .map_err(|e| ApiError::App(atelier_core::error::AppError::Internal(e.to_string())))?;

    Ok(Json(body))
}
