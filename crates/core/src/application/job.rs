// Job Handler - transport-agnostic queue-worker contract

use crate::application::art::ArtService;
use crate::domain::{ArtRequest, DomainError};
use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed message of the missing-fields failure; part of the worker contract.
pub const MISSING_FIELDS_ERROR: &str = "Missing required input fields.";

/// Job handler output, serialized verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOutput {
    Image { image_base64: String },
    Error { error: String, missing: Vec<String> },
}

/// Handles queue-worker job payloads.
///
/// The same rendering path as the HTTP surface, reached through a JSON
/// contract: `prompt`, `negative_prompt` and `image` (base64) in, a base64
/// PNG out.
pub struct JobRunner {
    art: Arc<ArtService>,
}

impl JobRunner {
    pub fn new(art: Arc<ArtService>) -> Self {
        Self { art }
    }

    /// The service this runner dispatches to.
    pub fn service(&self) -> &Arc<ArtService> {
        &self.art
    }

    /// Handle one job payload.
    ///
    /// Validation failures come back as a structured `JobOutput::Error`
    /// without touching the pipeline. A field counts as missing when it is
    /// absent, null, or an empty string. Broken inputs that pass validation
    /// (undecodable image bytes) surface as `Err` instead.
    pub async fn handle(&self, input: &Value) -> Result<JobOutput> {
        let prompt = text_field(input, "prompt");
        let negative_prompt = text_field(input, "negative_prompt");
        let image = text_field(input, "image");

        let (prompt, negative_prompt, image) = match (prompt, negative_prompt, image) {
            (Some(prompt), Some(negative_prompt), Some(image)) => {
                (prompt, negative_prompt, image)
            }
            (prompt, negative_prompt, image) => {
                let missing: Vec<String> = [
                    ("prompt", prompt.is_some()),
                    ("negative_prompt", negative_prompt.is_some()),
                    ("image", image.is_some()),
                ]
                .iter()
                .filter(|(_, present)| !*present)
                .map(|(name, _)| name.to_string())
                .collect();

                warn!(missing = ?missing, "Job input rejected");
                return Ok(JobOutput::Error {
                    error: MISSING_FIELDS_ERROR.to_string(),
                    missing,
                });
            }
        };

        let image_bytes = STANDARD
            .decode(image)
            .map_err(|e| DomainError::Decode(format!("invalid base64 image: {e}")))?;

        info!(
            prompt_len = prompt.len(),
            image_bytes = image_bytes.len(),
            "Handling generation job"
        );

        let request = ArtRequest::new(prompt, negative_prompt, image_bytes);
        let png = self.art.render(&request).await?;

        Ok(JobOutput::Image {
            image_base64: STANDARD.encode(png),
        })
    }
}

/// A field counts as present only when it is a non-empty string.
fn text_field<'a>(input: &'a Value, name: &str) -> Option<&'a str> {
    input
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
