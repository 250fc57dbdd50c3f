// Generation Pipeline Port
// Abstraction for the external diffusion inference runtime

use async_trait::async_trait;
use image::{GrayImage, RgbImage};
use thiserror::Error;

/// One generation invocation.
///
/// `conditioning` is the single-channel edge map constraining the output's
/// structure. Scale, steps and seed arrive from `InferenceSettings`; the
/// request carries them so the adapter stays a dumb wire mapper.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub conditioning: GrayImage,
    pub conditioning_scale: f32,
    pub steps: u32,
    pub seed: u64,
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Inference runtime unreachable: {0}")]
    Unreachable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Runtime response malformed: {0}")]
    MalformedResponse(String),
}

/// Generation pipeline trait
///
/// Deterministic for a fixed seed given fixed model weights. Latency is
/// dominated by the external model: callers must not impose a timeout
/// shorter than the pipeline's typical run time, and must not attempt to
/// cancel an in-flight generation (the computation is not safely
/// interruptible from this layer).
#[async_trait]
pub trait GenerationPipeline: Send + Sync {
    /// Render one image for the given request
    ///
    /// # Errors
    /// - PipelineError::Unreachable if the runtime cannot be reached
    /// - PipelineError::Inference if the runtime reports a failed generation
    /// - PipelineError::MalformedResponse if the reply cannot be decoded
    async fn generate(&self, request: &GenerationRequest) -> Result<RgbImage, PipelineError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use image::Rgb;
    use std::sync::{Arc, Mutex};

    /// Mock pipeline behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Render a deterministic image derived from seed and conditioning size
        Render,
        /// Always fail with message
        Fail(String),
    }

    /// Mock generation pipeline with call counting and request capture
    pub struct MockPipeline {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
        last_request: Arc<Mutex<Option<GenerationRequest>>>,
    }

    impl MockPipeline {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }

        pub fn new_render() -> Self {
            Self::new(MockBehavior::Render)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }

        /// The most recent request, for asserting what reached the pipeline
        pub fn last_request(&self) -> Option<GenerationRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationPipeline for MockPipeline {
        async fn generate(&self, request: &GenerationRequest) -> Result<RgbImage, PipelineError> {
            *self.call_count.lock().unwrap() += 1;
            *self.last_request.lock().unwrap() = Some(request.clone());

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Render => {
                    let (width, height) = request.conditioning.dimensions();
                    let seed = request.seed;
                    // Pixel values are a pure function of coordinates and seed,
                    // so equal requests render byte-identical images.
                    Ok(RgbImage::from_fn(width, height, |x, y| {
                        let mix = (x as u64)
                            .wrapping_mul(31)
                            .wrapping_add((y as u64).wrapping_mul(17))
                            .wrapping_add(seed);
                        Rgb([mix as u8, (mix >> 8) as u8, (mix >> 16) as u8])
                    }))
                }
                MockBehavior::Fail(msg) => Err(PipelineError::Inference(msg)),
            }
        }
    }
}
