pub mod utils;

use axum::http::StatusCode;
use bytes::Bytes;
use utils::{create_test_app, create_test_app_with_config, create_test_config};

#[test_log::test(tokio::test)]
async fn test_healthz() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(dir.path());

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[test_log::test(tokio::test)]
async fn test_openapi_json_and_docs_ui() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(dir.path());

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let document: serde_json::Value = response.json();
    assert_eq!(document["info"]["title"], "OpenAPI example");
    assert_eq!(document["info"]["version"], "2.1");
    assert!(document["paths"]["/multipart-form-data"]["post"].is_object());

    let response = server.get("/swagger").await;
    response.assert_status_ok();
    assert!(response.text().contains("<html"));
}

#[test_log::test(tokio::test)]
async fn test_docs_can_be_disabled_or_moved() {
    let dir = tempfile::tempdir().unwrap();

    let mut config = create_test_config(dir.path());
    config.docs.enabled = false;
    let server = create_test_app_with_config(config);
    server.get("/api-docs/openapi.json").await.assert_status(StatusCode::NOT_FOUND);
    server.get("/swagger").await.assert_status(StatusCode::NOT_FOUND);

    let mut config = create_test_config(dir.path());
    config.docs.path = "/docs".to_string();
    let server = create_test_app_with_config(config);
    server.get("/docs").await.assert_status_ok();
    server.get("/swagger").await.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(dir.path());
    config.uploads.stream_file_name = "../escape.txt".to_string();

    assert!(crate::Application::new(config).is_err());
}

/// Uploads under different names run side by side and both land intact.
#[test_log::test(tokio::test)]
async fn test_concurrent_uploads_are_independent() {
    use axum_test::multipart::{MultipartForm, Part};

    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(dir.path());

    let first = server.post("/multipart-form-data").multipart(
        MultipartForm::new()
            .add_text("description", "first")
            .add_part("file", Part::bytes(vec![b'a'; 64 * 1024]).file_name("a.bin")),
    );
    let second = server.post("/multipart-form-data").multipart(
        MultipartForm::new()
            .add_text("description", "second")
            .add_part("file", Part::bytes(vec![b'b'; 32 * 1024]).file_name("b.bin")),
    );

    let (first, second) = tokio::join!(async { first.await }, async { second.await });
    first.assert_status_ok();
    second.assert_status_ok();

    assert_eq!(std::fs::read(dir.path().join("a.bin")).unwrap(), vec![b'a'; 64 * 1024]);
    assert_eq!(std::fs::read(dir.path().join("b.bin")).unwrap(), vec![b'b'; 32 * 1024]);
}

#[test_log::test(tokio::test)]
async fn test_large_streamed_body_is_not_limited() {
    let dir = tempfile::tempdir().unwrap();
    let server = create_test_app(dir.path());

    // Larger than axum's default extractor body limit
    let payload = Bytes::from(vec![b'z'; 3 * 1024 * 1024]);
    server
        .post("/bytes-in-body/asynchronous-save-file")
        .bytes(payload.clone())
        .await
        .assert_status_ok();

    assert_eq!(std::fs::read(dir.path().join("file.txt")).unwrap(), payload.as_ref());
}

#[test_log::test(tokio::test)]
async fn test_slow_request_times_out_with_408() {
    use axum::{Router, routing::get};
    use std::time::Duration;

    let router = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "late"
            }),
        )
        .route("/fast", get(|| async { "on time" }))
        .layer(crate::timeout_layer(Duration::from_millis(50)));
    let server = axum_test::TestServer::new(router).unwrap();

    server.get("/slow").await.assert_status(StatusCode::REQUEST_TIMEOUT);
    server.get("/fast").await.assert_text("on time");
}
