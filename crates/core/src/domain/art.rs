// Art Generation Domain Model

use serde::{Deserialize, Serialize};

/// One art-generation request, decoded from either serving surface.
///
/// `image` carries the raw uploaded bytes (any decodable raster format);
/// decoding happens in the application layer so both the multipart and the
/// base64 job surface funnel into the same type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub image: Vec<u8>,
}

impl ArtRequest {
    pub fn new(
        prompt: impl Into<String>,
        negative_prompt: impl Into<String>,
        image: Vec<u8>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: negative_prompt.into(),
            image,
        }
    }
}

/// Fixed inference configuration applied to every generation.
///
/// Callers cannot override these. Keeping the surface non-configurable keeps
/// output reproducible across both serving surfaces for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Weight of the edge-map conditioning signal.
    pub conditioning_scale: f32,
    /// Denoising step count.
    pub steps: u32,
    /// RNG seed; fixed so identical inputs render identical output.
    pub seed: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            conditioning_scale: 0.5,
            steps: 20,
            seed: 0,
        }
    }
}
