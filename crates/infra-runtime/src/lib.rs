// Atelier Infrastructure - Inference Runtime Adapter
// Implements: GenerationPipeline over HTTP

pub mod http_pipeline;

pub use http_pipeline::HttpPipeline;
