//! Job Handler Contract Tests
//!
//! Exercises the queue-worker invocation path end to end against a mock
//! pipeline:
//! - Every missing-field combination is rejected without touching the pipeline
//! - The rejection body matches the worker contract exactly
//! - Valid payloads come back as decodable base64 PNG at input dimensions
//! - Fixed seed plus fixed input renders byte-identical output

use std::sync::Arc;

use atelier_core::application::job::MISSING_FIELDS_ERROR;
use atelier_core::application::{edge, ArtService, JobOutput, JobRunner};
use atelier_core::domain::InferenceSettings;
use atelier_core::port::pipeline::mocks::MockPipeline;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;

fn make_runner() -> (JobRunner, Arc<MockPipeline>) {
    let pipeline = Arc::new(MockPipeline::new_render());
    let art = Arc::new(ArtService::new(
        pipeline.clone(),
        InferenceSettings::default(),
    ));
    (JobRunner::new(art), pipeline)
}

/// A small decodable photo as base64 PNG.
fn photo_base64(width: u32, height: u32) -> String {
    let photo = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 11) as u8, 100])
    });
    STANDARD.encode(edge::encode_png(&photo).unwrap())
}

fn valid_payload() -> serde_json::Value {
    json!({
        "prompt": "stained glass fox",
        "negative_prompt": "low quality",
        "image": photo_base64(16, 12),
    })
}

#[tokio::test]
async fn each_missing_field_is_rejected_without_pipeline_call() {
    for dropped in ["prompt", "negative_prompt", "image"] {
        let (runner, pipeline) = make_runner();
        let mut input = valid_payload();
        input.as_object_mut().unwrap().remove(dropped);

        let output = runner.handle(&input).await.unwrap();

        match output {
            JobOutput::Error { error, missing } => {
                assert_eq!(error, MISSING_FIELDS_ERROR);
                assert_eq!(missing, vec![dropped.to_string()]);
            }
            other => panic!("expected a rejection for missing {dropped}, got {other:?}"),
        }
        assert_eq!(
            pipeline.call_count(),
            0,
            "pipeline must never run for an invalid job"
        );
    }

    println!("✅ All three single-field omissions rejected before the pipeline");
}

#[tokio::test]
async fn empty_payload_lists_every_field() {
    let (runner, _pipeline) = make_runner();

    let output = runner.handle(&json!({})).await.unwrap();

    match output {
        JobOutput::Error { missing, .. } => {
            assert_eq!(missing, vec!["prompt", "negative_prompt", "image"]);
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn null_and_empty_values_count_as_missing() {
    let (runner, pipeline) = make_runner();
    let input = json!({
        "prompt": null,
        "negative_prompt": "",
        "image": photo_base64(8, 8),
    });

    let output = runner.handle(&input).await.unwrap();

    match output {
        JobOutput::Error { missing, .. } => {
            assert_eq!(missing, vec!["prompt", "negative_prompt"]);
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(pipeline.call_count(), 0);
}

#[tokio::test]
async fn rejection_serializes_to_the_worker_contract() {
    let (runner, _pipeline) = make_runner();

    let output = runner.handle(&json!({ "prompt": "alone" })).await.unwrap();
    let body = serde_json::to_value(output).unwrap();

    assert_eq!(
        body,
        json!({
            "error": "Missing required input fields.",
            "missing": ["negative_prompt", "image"],
        })
    );
}

#[tokio::test]
async fn valid_payload_renders_base64_png_at_input_dimensions() {
    let (runner, pipeline) = make_runner();

    let output = runner.handle(&valid_payload()).await.unwrap();

    let encoded = match output {
        JobOutput::Image { image_base64 } => image_base64,
        other => panic!("expected an image, got {other:?}"),
    };
    let png = STANDARD.decode(encoded).unwrap();
    let rendered = image::load_from_memory(&png).unwrap().to_rgb8();

    assert_eq!(rendered.dimensions(), (16, 12));
    assert_eq!(pipeline.call_count(), 1);

    // The conditioning that reached the pipeline carries the fixed settings.
    let request = pipeline.last_request().unwrap();
    assert_eq!(request.conditioning.dimensions(), (16, 12));
    assert_eq!(request.conditioning_scale, 0.5);
    assert_eq!(request.steps, 20);
    assert_eq!(request.seed, 0);
}

#[tokio::test]
async fn fixed_seed_renders_are_byte_identical() {
    let (runner, pipeline) = make_runner();
    let input = valid_payload();

    let first = runner.handle(&input).await.unwrap();
    let second = runner.handle(&input).await.unwrap();

    assert_eq!(
        first, second,
        "fixed seed and fixed input must render identically"
    );
    assert_eq!(pipeline.call_count(), 2);
}

#[tokio::test]
async fn undecodable_image_is_an_error_not_a_rejection() {
    let (runner, pipeline) = make_runner();
    let input = json!({
        "prompt": "ok",
        "negative_prompt": "ok",
        "image": STANDARD.encode(b"not a png at all"),
    });

    let outcome = runner.handle(&input).await;

    assert!(outcome.is_err(), "broken bytes are an error, not a validation miss");
    assert_eq!(pipeline.call_count(), 0);
}
