// HTTP adapter to the inference runtime
// reason: the diffusion model runs in its own process; we talk JSON over localhost
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{GrayImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use atelier_core::port::pipeline::{GenerationPipeline, GenerationRequest, PipelineError};

/// Default per-request timeout.
///
/// Generation latency is dominated by the model, and a run on modest
/// hardware can take minutes. The timeout exists to catch a hung runtime,
/// never to cut short a slow-but-live generation.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Interval between readiness probes while the runtime loads model weights.
const READY_PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Pipeline backed by the inference runtime's HTTP endpoint.
///
/// `POST {base}/generate` runs one generation; `GET {base}/health` answers
/// once model weights are loaded. Requests are sent one at a time by the
/// caller, so this adapter holds no queue of its own.
pub struct HttpPipeline {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    /// Base64 PNG of the single-channel conditioning map.
    image: String,
    conditioning_scale: f32,
    steps: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    /// Base64 PNG of the rendered image.
    image: String,
}

impl HttpPipeline {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PipelineError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build a pipeline with an explicit per-request timeout.
    ///
    /// The timeout must stay well above the model's typical run time; this
    /// layer never cancels an in-flight generation.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Unreachable(e.to_string()))?;

        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Wait until the runtime's health endpoint answers.
    ///
    /// The runtime only starts answering once model weights are loaded, so
    /// callers gate their own readiness on this returning Ok.
    pub async fn wait_until_ready(&self, deadline: Duration) -> Result<(), PipelineError> {
        let url = format!("{}/health", self.base_url);
        let started = Instant::now();

        loop {
            match self.client.get(&url).send().await {
                Ok(reply) if reply.status().is_success() => {
                    info!(
                        elapsed_secs = started.elapsed().as_secs(),
                        "Inference runtime ready"
                    );
                    return Ok(());
                }
                Ok(reply) => {
                    debug!(status = %reply.status(), "Runtime not ready yet");
                }
                Err(e) => {
                    debug!(error = %e, "Runtime health probe failed");
                }
            }

            if started.elapsed() >= deadline {
                return Err(PipelineError::Unreachable(format!(
                    "runtime not ready within {}s",
                    deadline.as_secs()
                )));
            }
            tokio::time::sleep(READY_PROBE_INTERVAL).await;
        }
    }
}

/// Encode the conditioning map as PNG for the wire.
fn encode_conditioning(map: &GrayImage) -> Result<String, PipelineError> {
    let mut bytes = Vec::new();
    map.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| PipelineError::Inference(format!("conditioning encode failed: {e}")))?;
    Ok(STANDARD.encode(bytes))
}

#[async_trait]
impl GenerationPipeline for HttpPipeline {
    async fn generate(&self, request: &GenerationRequest) -> Result<RgbImage, PipelineError> {
        let body = GenerateBody {
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
            image: encode_conditioning(&request.conditioning)?,
            conditioning_scale: request.conditioning_scale,
            steps: request.steps,
            seed: request.seed,
        };

        let url = format!("{}/generate", self.base_url);
        debug!(url = %url, steps = request.steps, seed = request.seed, "Dispatching generation");

        let reply = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Unreachable(e.to_string()))?;

        let status = reply.status();
        if !status.is_success() {
            let detail = reply.text().await.unwrap_or_default();
            warn!(status = %status, detail = %detail, "Runtime rejected generation");
            return Err(PipelineError::Inference(format!(
                "runtime returned {status}: {detail}"
            )));
        }

        let reply: GenerateReply = reply
            .json()
            .await
            .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

        let rendered = STANDARD
            .decode(reply.image)
            .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;
        let rendered = image::load_from_memory(&rendered)
            .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

        Ok(rendered.to_rgb8())
    }
}
