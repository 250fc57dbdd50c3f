// Art Service - decode, condition, generate, encode

use crate::application::edge;
use crate::domain::{ArtRequest, InferenceSettings};
use crate::error::Result;
use crate::port::{GenerationPipeline, GenerationRequest};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Renders art requests through the generation pipeline.
///
/// Holds the only cross-request state in the serving process: the pipeline
/// handle, constructed once before the listener binds, and the gate that
/// serializes invocations. Concurrent generations share one accelerator
/// context, so they must not overlap.
pub struct ArtService {
    pipeline: Arc<dyn GenerationPipeline>,
    settings: InferenceSettings,
    gate: Mutex<()>,
}

impl ArtService {
    pub fn new(pipeline: Arc<dyn GenerationPipeline>, settings: InferenceSettings) -> Self {
        Self {
            pipeline,
            settings,
            gate: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> InferenceSettings {
        self.settings
    }

    /// Render one request and return the PNG-encoded output.
    ///
    /// Undecodable input fails before the pipeline is touched. A failed
    /// generation propagates as-is; nothing here retries it.
    pub async fn render(&self, request: &ArtRequest) -> Result<Vec<u8>> {
        let source = edge::decode_rgb(&request.image)?;
        let conditioning = edge::edge_map(&source);

        let (width, height) = conditioning.dimensions();
        debug!(width, height, "Conditioning edge map prepared");

        let generation = GenerationRequest {
            prompt: request.prompt.clone(),
            negative_prompt: request.negative_prompt.clone(),
            conditioning,
            conditioning_scale: self.settings.conditioning_scale,
            steps: self.settings.steps,
            seed: self.settings.seed,
        };

        let rendered = {
            let _slot = self.gate.lock().await;
            self.pipeline.generate(&generation).await?
        };

        info!(width, height, steps = self.settings.steps, "Generation complete");
        let png = edge::encode_png(&rendered)?;
        Ok(png)
    }
}
