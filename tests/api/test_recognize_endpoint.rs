// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /api/recognize
//!
//! Every outcome, success or failure, is an HTTP 200 with a JSON envelope.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use plate_recognition_node::{
    api::{create_app, AppState, RecognizeResponse},
    pipeline::{RecognitionPipeline, Rectangle},
    vision::TextEngine,
};
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{blank_image, plate_image, png_bytes, FailingEngine, FixedTextEngine};

const BOUNDARY: &str = "plate-test-boundary";

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    data: &'a [u8],
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/recognize")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn file_part(data: &[u8]) -> Part<'_> {
    Part {
        name: "file",
        file_name: Some("car.png"),
        data,
    }
}

fn app_with(engine: Arc<dyn TextEngine>) -> Router {
    create_app(AppState::new(RecognitionPipeline::new(engine)))
}

async fn send(app: Router, request: Request<Body>) -> RecognizeResponse {
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_plate_upload_succeeds() {
    let app = app_with(Arc::new(FixedTextEngine::new("KL 07 CU 7475")));
    let image = png_bytes(&plate_image());

    let response = send(app, upload_request(&[file_part(&image)])).await;

    assert!(response.success);
    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert!(!result.is_empty() && result.len() <= 3);
    assert!(result.iter().all(|item| item.text == "KL 07 CU 7475"));
}

#[tokio::test]
async fn test_blank_upload_reports_full_frame() {
    let app = app_with(Arc::new(FixedTextEngine::new("")));
    let image = png_bytes(&blank_image(200, 100));

    let response = send(app, upload_request(&[file_part(&image)])).await;

    let result = response.result.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].bbox, Rectangle::new(0, 0, 200, 100));
    assert_eq!(result[0].text, "");
}

#[tokio::test]
async fn test_raw_json_envelope() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));
    let image = png_bytes(&blank_image(30, 10));

    let response = app.oneshot(upload_request(&[file_part(&image)])).await.unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "success": true,
            "result": [{"bbox": [0, 0, 30, 10], "text": "AB"}]
        })
    );
}

#[tokio::test]
async fn test_other_file_field_is_accepted() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));
    let image = png_bytes(&blank_image(30, 10));

    let parts = [
        Part {
            name: "comment",
            file_name: None,
            data: b"front bumper",
        },
        Part {
            name: "image",
            file_name: Some("car.png"),
            data: &image,
        },
    ];
    let response = send(app, upload_request(&parts)).await;

    assert!(response.success);
}

#[tokio::test]
async fn test_text_file_upload_fails_in_band() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));

    let response = send(
        app,
        upload_request(&[Part {
            name: "file",
            file_name: Some("notes.txt"),
            data: b"this is not an image",
        }]),
    )
    .await;

    assert!(!response.success);
    assert!(response.result.is_none());
    assert_eq!(response.error.as_deref(), Some("Unsupported image format"));
}

#[tokio::test]
async fn test_missing_file_fails_in_band() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));

    let response = send(
        app,
        upload_request(&[Part {
            name: "comment",
            file_name: None,
            data: b"no image here",
        }]),
    )
    .await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("no file uploaded"));
}

#[tokio::test]
async fn test_non_multipart_request_fails_in_band() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/recognize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image": "abc"}"#))
        .unwrap();
    let response = send(app, request).await;

    assert!(!response.success);
    assert!(response.error.is_some());
}

#[tokio::test]
async fn test_engine_failure_fails_in_band() {
    let app = app_with(Arc::new(FailingEngine));
    let image = png_bytes(&plate_image());

    let response = send(app, upload_request(&[file_part(&image)])).await;

    assert!(!response.success);
    assert!(response.error.unwrap().contains("resource exhausted"));
}

#[tokio::test]
async fn test_oversized_image_fails_in_band() {
    let pipeline =
        RecognitionPipeline::new(Arc::new(FixedTextEngine::new("AB"))).with_max_image_bytes(256);
    let app = create_app(AppState::new(pipeline));
    let image = png_bytes(&plate_image());
    assert!(image.len() > 256);

    let response = send(app, upload_request(&[file_part(&image)])).await;

    assert!(!response.success);
    assert!(response.error.unwrap().contains("too large"));
}

#[tokio::test]
async fn test_body_over_limit_fails_in_band() {
    let pipeline =
        RecognitionPipeline::new(Arc::new(FixedTextEngine::new("AB"))).with_max_image_bytes(256);
    let app = create_app(AppState::new(pipeline));

    // Past max_image_bytes plus the 64 KiB multipart allowance
    let payload = vec![0u8; 256 + 64 * 1024 + 4096];
    let response = send(app, upload_request(&[file_part(&payload)])).await;

    assert!(!response.success);
    assert!(response.result.is_none());
    assert!(response.error.is_some());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/recognize")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_get_is_not_routed() {
    let app = app_with(Arc::new(FixedTextEngine::new("AB")));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/recognize")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
