//! HTTP Surface Tests
//!
//! Drives the axum router in-process (no sockets) and verifies:
//! - /health answers the fixed contract body
//! - /generate-art consumes multipart and replies with PNG bytes
//! - Upload mistakes surface as client errors with a JSON error body
//! - /run speaks the queue-worker job contract verbatim

use std::sync::Arc;

use atelier_api_http::{build_router, AppState};
use atelier_core::application::{edge, ArtService};
use atelier_core::domain::InferenceSettings;
use atelier_core::port::pipeline::mocks::MockPipeline;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "atelier-test-boundary";

enum Part<'a> {
    Text(&'a str),
    File(&'a [u8]),
}

fn make_router() -> (Router, Arc<MockPipeline>) {
    let pipeline = Arc::new(MockPipeline::new_render());
    let art = Arc::new(ArtService::new(
        pipeline.clone(),
        InferenceSettings::default(),
    ));
    (build_router(AppState::new(art)), pipeline)
}

fn photo_png(width: u32, height: u32) -> Vec<u8> {
    let photo = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 5) as u8, (y * 3) as u8, 64])
    });
    edge::encode_png(&photo).unwrap()
}

/// Build a multipart/form-data body by hand; three fields is not worth a
/// client crate in the dev-dependency tree.
fn multipart_body(fields: &[(&str, Part<'_>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, part) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(fields: &[(&str, Part<'_>)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate-art")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn health_answers_the_fixed_contract() {
    let (router, _pipeline) = make_router();

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn generate_art_replies_with_png_bytes() {
    let (router, pipeline) = make_router();
    let photo = photo_png(20, 14);

    let response = router
        .oneshot(multipart_request(&[
            ("image", Part::File(&photo)),
            ("prompt", Part::Text("a lighthouse in a storm")),
            ("negative_prompt", Part::Text("blurry")),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let rendered = image::load_from_memory(&body_bytes(response).await)
        .unwrap()
        .to_rgb8();
    assert_eq!(rendered.dimensions(), (20, 14));
    assert_eq!(pipeline.call_count(), 1);

    println!("✅ Multipart upload came back as a PNG at input dimensions");
}

#[tokio::test]
async fn missing_prompt_part_is_unprocessable() {
    let (router, pipeline) = make_router();
    let photo = photo_png(8, 8);

    let response = router
        .oneshot(multipart_request(&[
            ("image", Part::File(&photo)),
            ("negative_prompt", Part::Text("blurry")),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "missing_field");
    assert_eq!(pipeline.call_count(), 0);
}

#[tokio::test]
async fn undecodable_upload_is_a_client_error() {
    let (router, pipeline) = make_router();

    let response = router
        .oneshot(multipart_request(&[
            ("image", Part::File(b"these are not pixels")),
            ("prompt", Part::Text("a lighthouse")),
            ("negative_prompt", Part::Text("")),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "undecodable_image");
    assert_eq!(pipeline.call_count(), 0);
}

#[tokio::test]
async fn run_job_returns_the_rendered_image() {
    let (router, pipeline) = make_router();
    let payload = json!({
        "prompt": "a lighthouse in a storm",
        "negative_prompt": "blurry",
        "image": STANDARD.encode(photo_png(10, 10)),
    });

    let response = router
        .oneshot(
            Request::post("/run")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let png = STANDARD.decode(body["image_base64"].as_str().unwrap()).unwrap();
    assert_eq!(
        image::load_from_memory(&png).unwrap().to_rgb8().dimensions(),
        (10, 10)
    );
    assert_eq!(pipeline.call_count(), 1);
}

#[tokio::test]
async fn run_job_rejection_is_structured_not_an_http_error() {
    let (router, pipeline) = make_router();

    let response = router
        .oneshot(
            Request::post("/run")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "prompt": "alone" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // The job contract reports validation in the body, not the status line.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "Missing required input fields.",
            "missing": ["negative_prompt", "image"],
        })
    );
    assert_eq!(pipeline.call_count(), 0);
}
