// ABOUTME: HTTP integration tests for image upload, download, and deletion
// ABOUTME: Covers content type checks, size limits, path safety, and product image cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::TestServer;
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

async fn upload(server: &TestServer, content_type: &str, bytes: &[u8]) -> (u16, Value) {
    let response = AxumTestRequest::post("/api/images")
        .raw(content_type, bytes.to_vec())
        .send(server.router())
        .await;
    let status = response.status();
    (status, response.json())
}

// ============================================================================
// Upload and download
// ============================================================================

#[tokio::test]
async fn test_upload_then_download_image() {
    let server = TestServer::new().await.unwrap();

    let (status, body) = upload(&server, "image/png", PNG_BYTES).await;
    assert_eq!(status, 201);
    let filename = body["filename"].as_str().unwrap().to_owned();
    assert!(filename.ends_with(".png"));
    assert_eq!(body["url"], format!("/api/images/{filename}"));
    assert!(server.upload_dir.path().join(&filename).exists());

    let response = AxumTestRequest::get(&format!("/api/images/{filename}"))
        .send(server.router())
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("content-type").as_deref(), Some("image/png"));
    assert_eq!(response.bytes(), PNG_BYTES);
}

#[tokio::test]
async fn test_upload_rejects_non_image_content_type() {
    let server = TestServer::new().await.unwrap();

    let (status, body) = upload(&server, "text/plain", b"hello").await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn test_upload_rejects_empty_body() {
    let server = TestServer::new().await.unwrap();

    let (status, _) = upload(&server, "image/jpeg", b"").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_upload_over_limit_is_payload_too_large() {
    let server = TestServer::with_config(|config| config.images.max_bytes = 8)
        .await
        .unwrap();

    let (status, body) = upload(&server, "image/gif", b"GIF89a-xx").await;
    assert_eq!(status, 413);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");

    let response = AxumTestRequest::post("/api/images")
        .raw("image/gif", vec![0_u8; 64])
        .send(server.router())
        .await;
    assert_eq!(response.status(), 413);
}

#[tokio::test]
async fn test_unknown_or_unsafe_image_names() {
    let server = TestServer::new().await.unwrap();

    let missing = AxumTestRequest::get("/api/images/absent.png")
        .send(server.router())
        .await;
    assert_eq!(missing.status(), 404);

    let wrong_extension = AxumTestRequest::get("/api/images/notes.txt")
        .send(server.router())
        .await;
    assert_eq!(wrong_extension.status(), 400);

    let hidden = AxumTestRequest::get("/api/images/.png")
        .send(server.router())
        .await;
    assert_eq!(hidden.status(), 400);
}

#[tokio::test]
async fn test_delete_image() {
    let server = TestServer::new().await.unwrap();
    let (_, body) = upload(&server, "image/webp", b"RIFF-webp").await;
    let filename = body["filename"].as_str().unwrap().to_owned();

    let deleted = AxumTestRequest::delete(&format!("/api/images/{filename}"))
        .send(server.router())
        .await;
    assert_eq!(deleted.status(), 204);
    assert!(!server.upload_dir.path().join(&filename).exists());

    let again = AxumTestRequest::delete(&format!("/api/images/{filename}"))
        .send(server.router())
        .await;
    assert_eq!(again.status(), 404);
}

// ============================================================================
// Product images
// ============================================================================

#[tokio::test]
async fn test_deleting_product_removes_its_image() {
    let server = TestServer::new().await.unwrap();
    let (_, image) = upload(&server, "image/png", PNG_BYTES).await;
    let filename = image["filename"].as_str().unwrap().to_owned();

    let product: Value = AxumTestRequest::post("/api/products")
        .json(&json!({"name": "Ravioli", "price": 7.0, "image": filename}))
        .send(server.router())
        .await
        .json();
    assert_eq!(product["image_url"], format!("/api/images/{filename}"));

    let deleted = AxumTestRequest::delete(&format!(
        "/api/products/{}",
        product["id"].as_str().unwrap()
    ))
    .send(server.router())
    .await;
    assert_eq!(deleted.status(), 204);
    assert!(!server.upload_dir.path().join(&filename).exists());
}

#[tokio::test]
async fn test_replacing_product_image_discards_previous_file() {
    let server = TestServer::new().await.unwrap();
    let (_, first) = upload(&server, "image/png", PNG_BYTES).await;
    let (_, second) = upload(&server, "image/png", PNG_BYTES).await;
    let first = first["filename"].as_str().unwrap().to_owned();
    let second = second["filename"].as_str().unwrap().to_owned();

    let product: Value = AxumTestRequest::post("/api/products")
        .json(&json!({"name": "Gnocchi", "price": 6.0, "image": first}))
        .send(server.router())
        .await
        .json();

    let updated = AxumTestRequest::put(&format!(
        "/api/products/{}",
        product["id"].as_str().unwrap()
    ))
    .json(&json!({"name": "Gnocchi", "price": 6.0, "image": second}))
    .send(server.router())
    .await;
    assert_eq!(updated.status(), 200);

    assert!(!server.upload_dir.path().join(&first).exists());
    assert!(server.upload_dir.path().join(&second).exists());
}

#[tokio::test]
async fn test_shared_image_survives_deleting_one_product() {
    let server = TestServer::new().await.unwrap();
    let (_, image) = upload(&server, "image/png", PNG_BYTES).await;
    let filename = image["filename"].as_str().unwrap().to_owned();

    let tagliatelle: Value = AxumTestRequest::post("/api/products")
        .json(&json!({"name": "Tagliatelle", "price": 5.0, "image": filename}))
        .send(server.router())
        .await
        .json();
    let pappardelle: Value = AxumTestRequest::post("/api/products")
        .json(&json!({"name": "Pappardelle", "price": 5.5, "image": filename}))
        .send(server.router())
        .await
        .json();

    let deleted = AxumTestRequest::delete(&format!(
        "/api/products/{}",
        tagliatelle["id"].as_str().unwrap()
    ))
    .send(server.router())
    .await;
    assert_eq!(deleted.status(), 204);

    let served = AxumTestRequest::get(&format!("/api/images/{filename}"))
        .send(server.router())
        .await;
    assert_eq!(served.status(), 200);

    let remaining: Value = AxumTestRequest::get(&format!(
        "/api/products/{}",
        pappardelle["id"].as_str().unwrap()
    ))
    .send(server.router())
    .await
    .json();
    assert_eq!(remaining["image_url"], format!("/api/images/{filename}"));

    let last = AxumTestRequest::delete(&format!(
        "/api/products/{}",
        pappardelle["id"].as_str().unwrap()
    ))
    .send(server.router())
    .await;
    assert_eq!(last.status(), 204);
    assert!(!server.upload_dir.path().join(&filename).exists());
}

#[tokio::test]
async fn test_replacing_shared_image_keeps_file_for_other_product() {
    let server = TestServer::new().await.unwrap();
    let (_, first) = upload(&server, "image/png", PNG_BYTES).await;
    let (_, second) = upload(&server, "image/png", PNG_BYTES).await;
    let first = first["filename"].as_str().unwrap().to_owned();
    let second = second["filename"].as_str().unwrap().to_owned();

    let fusilli: Value = AxumTestRequest::post("/api/products")
        .json(&json!({"name": "Fusilli", "price": 4.0, "image": first}))
        .send(server.router())
        .await
        .json();
    let penne = AxumTestRequest::post("/api/products")
        .json(&json!({"name": "Penne", "price": 4.0, "image": first}))
        .send(server.router())
        .await;
    assert_eq!(penne.status(), 201);

    let updated = AxumTestRequest::put(&format!(
        "/api/products/{}",
        fusilli["id"].as_str().unwrap()
    ))
    .json(&json!({"name": "Fusilli", "price": 4.0, "image": second}))
    .send(server.router())
    .await;
    assert_eq!(updated.status(), 200);

    assert!(server.upload_dir.path().join(&first).exists());
}
