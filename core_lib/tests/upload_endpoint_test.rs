use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use core_lib::files::{FileStore, FileStoreConfig, FileValidationConfig};
use core_lib::{create_app_with_config, AppConfig, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn setup_test_app() -> (Router, FileStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();

    let store = FileStore::new(FileStoreConfig {
        storage_path: temp_dir.path().to_path_buf(),
        validation: FileValidationConfig::default(),
    });

    let app = create_app_with_config(AppState::new(store.clone()), AppConfig::default());

    (app, store, temp_dir)
}

fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_within_policy_succeeds() {
    let (app, store, _temp_dir) = setup_test_app();
    store.initialize().await.unwrap();

    // 5 MB is over axum's stock body cap but inside the 10 MiB policy
    let data = vec![0xFF; 5 * 1024 * 1024];
    let response = app
        .oneshot(upload_request(&[("photo.jpg", "image/jpeg", &data)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["message"], "Files uploaded successfully");
    assert_eq!(json["files"].as_array().unwrap().len(), 1);
    assert_eq!(json["files"][0]["name"], "photo.jpg");
    assert_eq!(json["files"][0]["type"], "image");
    assert_eq!(json["files"][0]["size"], 5 * 1024 * 1024);

    assert_eq!(store.list_files().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversized_upload_reports_too_large() {
    let (app, store, _temp_dir) = setup_test_app();
    store.initialize().await.unwrap();

    let data = vec![0x89; 15 * 1024 * 1024];
    let response = app
        .oneshot(upload_request(&[("huge.png", "image/png", &data)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("too large"), "unexpected error: {}", message);

    assert!(store.list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disallowed_type_upload_is_rejected() {
    let (app, store, _temp_dir) = setup_test_app();
    store.initialize().await.unwrap();

    let response = app
        .oneshot(upload_request(&[("data.json", "application/json", b"{}")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("not allowed"), "unexpected error: {}", message);

    assert!(store.list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_with_one_invalid_file_persists_nothing() {
    let (app, store, _temp_dir) = setup_test_app();
    store.initialize().await.unwrap();

    let ok = vec![0xFF; 1024 * 1024];
    let too_big = vec![0x89; 15 * 1024 * 1024];
    let response = app
        .oneshot(upload_request(&[
            ("ok.jpg", "image/jpeg", &ok),
            ("huge.png", "image/png", &too_big),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.list_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_and_delete_round_trip() {
    let (app, store, _temp_dir) = setup_test_app();
    store.initialize().await.unwrap();

    let response = app
        .clone()
        .oneshot(upload_request(&[("notes.txt", "text/plain", b"remember")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    let id = json["files"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/files/{}/download", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/plain"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"remember");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/files/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/files/{}/download", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let (app, store, _temp_dir) = setup_test_app();
    store.initialize().await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/files/no-such-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
