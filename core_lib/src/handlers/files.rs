use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    files::{FileCategory, FileUpload, StoredFile},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub category: FileCategory,
    #[serde(rename = "uploadDate")]
    pub upload_date: DateTime<Utc>,
}

impl From<StoredFile> for FileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
            size: file.size,
            category: file.category,
            upload_date: file.upload_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<FileResponse>,
}

pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("files") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest("Missing filename".to_string()))?
            .to_string();

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        uploads.push(FileUpload {
            original_filename: filename,
            content_type,
            data: data.to_vec(),
        });
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest("No files provided".to_string()));
    }

    let stored = state.file_store.store_batch(uploads).await?;

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        files: stored.into_iter().map(|f| f.into()).collect(),
    }))
}

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileResponse>>> {
    let files = state.file_store.list_files().await?;

    Ok(Json(files.into_iter().map(|f| f.into()).collect()))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response> {
    let (metadata, data) = state.file_store.file_data(&file_id).await?;

    let content_type = metadata.content_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&metadata.path)
            .first_or_octet_stream()
            .to_string()
    });

    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        content_type
            .parse()
            .unwrap_or_else(|_| "application/octet-stream".parse().unwrap()),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        data.len().to_string().parse().unwrap(),
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        metadata.name.replace('"', "\\\"")
    );
    if let Ok(value) = disposition.parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((StatusCode::OK, headers, data).into_response())
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.file_store.delete_file(&file_id).await?;

    Ok(Json(serde_json::json!({
        "message": "File deleted successfully"
    })))
}
