use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::category::FileCategory;
use super::models::{FileRecord, FileUpload, StoredFile};
use super::validation::{FileValidationConfig, FileValidator};

/// Directory under the storage root holding one JSON metadata record per
/// stored file.
const META_DIR: &str = ".meta";

#[derive(Clone)]
pub struct FileStoreConfig {
    pub storage_path: PathBuf,
    pub validation: FileValidationConfig,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("uploads"),
            validation: FileValidationConfig::default(),
        }
    }
}

/// Filesystem-backed file store.
///
/// The storage root is the single source of truth: every list or lookup
/// is a fresh scan, no index is kept across requests. Content lives flat
/// as `<root>/<id><ext>`; upload-time metadata lives in
/// `<root>/.meta/<id>.json`.
#[derive(Clone)]
pub struct FileStore {
    config: FileStoreConfig,
    validator: FileValidator,
}

impl FileStore {
    pub fn new(config: FileStoreConfig) -> Self {
        let validator = FileValidator::new(config.validation.clone());

        Self { config, validator }
    }

    pub fn with_default_config() -> Self {
        Self::new(FileStoreConfig::default())
    }

    pub fn storage_path(&self) -> &Path {
        &self.config.storage_path
    }

    pub async fn initialize(&self) -> Result<()> {
        async_fs::create_dir_all(self.meta_dir()).await?;
        Ok(())
    }

    fn meta_dir(&self) -> PathBuf {
        self.config.storage_path.join(META_DIR)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.meta_dir().join(format!("{}.json", id))
    }

    /// Persists a batch all-or-nothing: every upload is validated before
    /// the first byte of any of them is written, and an I/O failure
    /// mid-batch rolls back the files already written for this batch.
    pub async fn store_batch(&self, uploads: Vec<FileUpload>) -> Result<Vec<StoredFile>> {
        for upload in &uploads {
            self.validator
                .validate_upload(&upload.content_type, upload.data.len() as u64)?;
        }

        let mut stored = Vec::with_capacity(uploads.len());

        for upload in uploads {
            match self.persist(upload).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.rollback(&stored).await;
                    return Err(e);
                }
            }
        }

        Ok(stored)
    }

    pub async fn store_file(&self, upload: FileUpload) -> Result<StoredFile> {
        self.validator
            .validate_upload(&upload.content_type, upload.data.len() as u64)?;
        self.persist(upload).await
    }

    async fn persist(&self, upload: FileUpload) -> Result<StoredFile> {
        let id = Uuid::new_v4();
        let extension = Path::new(&upload.original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let filename = if extension.is_empty() {
            id.to_string()
        } else {
            format!("{}.{}", id, extension)
        };

        let content_path = self.config.storage_path.join(&filename);
        let size = upload.data.len() as u64;
        let uploaded_at = Utc::now();

        let mut file = async_fs::File::create(&content_path).await?;
        file.write_all(&upload.data).await?;
        file.sync_all().await?;

        let category = FileCategory::from_content_type(&upload.content_type);
        let record = FileRecord {
            id,
            original_filename: upload.original_filename,
            content_type: upload.content_type,
            category,
            size,
            uploaded_at,
        };

        if let Err(e) = self.write_record(&record).await {
            let _ = async_fs::remove_file(&content_path).await;
            return Err(e);
        }

        tracing::info!(id = %id, filename = %filename, size = size, "stored file");

        Ok(StoredFile {
            id: id.to_string(),
            name: record.original_filename,
            size,
            category: record.category,
            upload_date: uploaded_at,
            content_type: Some(record.content_type),
            path: content_path,
        })
    }

    /// Sidecar records are written to a temp name and renamed into place
    /// so a crash never leaves a half-written record.
    async fn write_record(&self, record: &FileRecord) -> Result<()> {
        let tmp_path = self.meta_dir().join(format!(".tmp-{}", record.id));
        let final_path = self.record_path(&record.id.to_string());

        let bytes = serde_json::to_vec_pretty(record)?;

        let mut file = async_fs::File::create(&tmp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;

        async_fs::rename(&tmp_path, &final_path).await?;

        Ok(())
    }

    async fn read_record(&self, id: &str) -> Option<FileRecord> {
        let bytes = async_fs::read(self.record_path(id)).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "ignoring corrupt metadata record");
                None
            }
        }
    }

    async fn rollback(&self, stored: &[StoredFile]) {
        for file in stored {
            if let Err(e) = async_fs::remove_file(&file.path).await {
                tracing::error!(id = %file.id, error = %e, "failed to roll back batch file");
            }
            let _ = async_fs::remove_file(self.record_path(&file.id)).await;
        }
    }

    /// Scans the storage root and reconstructs every stored file. A fresh
    /// scan on every call; metadata comes from the sidecar record, or is
    /// derived from the file on disk when no record exists.
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();

        let mut entries = match async_fs::read_dir(&self.config.storage_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let path = entry.path();
            let id = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            let stored = match self.read_record(&id).await {
                Some(record) => StoredFile {
                    id,
                    name: record.original_filename,
                    size: record.size,
                    category: record.category,
                    upload_date: record.uploaded_at,
                    content_type: Some(record.content_type),
                    path,
                },
                None => self.reconstruct_from_disk(id, path, &entry).await?,
            };

            files.push(stored);
        }

        Ok(files)
    }

    /// Fallback for files placed under the root without a metadata
    /// record: name from the on-disk filename, category from the
    /// extension, size and date from filesystem metadata.
    async fn reconstruct_from_disk(
        &self,
        id: String,
        path: PathBuf,
        entry: &async_fs::DirEntry,
    ) -> Result<StoredFile> {
        let metadata = entry.metadata().await?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        Ok(StoredFile {
            id,
            name,
            size: metadata.len(),
            category: FileCategory::from_extension(extension),
            upload_date: modified,
            content_type: None,
            path,
        })
    }

    /// Maps an identifier to the path of its content file.
    ///
    /// Matching is exact equality against the filename stem; an id that
    /// is merely a prefix of another file's name never resolves.
    pub async fn resolve(&self, id: &str) -> Result<PathBuf> {
        let mut entries = match async_fs::read_dir(&self.config.storage_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(id) {
                return Ok(path);
            }
        }

        Err(AppError::NotFound("File not found".to_string()))
    }

    /// Resolves an id and reads its content. The file vanishing between
    /// resolution and read (a concurrent delete) surfaces as `NotFound`,
    /// not as an internal error.
    pub async fn file_data(&self, id: &str) -> Result<(StoredFile, Vec<u8>)> {
        let path = self.resolve(id).await?;

        let data = match async_fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to read stored file");
                return Err(e.into());
            }
        };

        let stored = self.describe(&path, data.len() as u64).await;

        Ok((stored, data))
    }

    async fn describe(&self, path: &Path, size: u64) -> StoredFile {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if let Some(record) = self.read_record(&id).await {
            return StoredFile {
                id,
                name: record.original_filename,
                size: record.size,
                category: record.category,
                upload_date: record.uploaded_at,
                content_type: Some(record.content_type),
                path: path.to_path_buf(),
            };
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        StoredFile {
            id,
            name: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
            size,
            category: FileCategory::from_extension(extension),
            upload_date: Utc::now(),
            content_type: None,
            path: path.to_path_buf(),
        }
    }

    pub async fn delete_file(&self, id: &str) -> Result<()> {
        let path = self.resolve(id).await?;

        match async_fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to delete file");
                return Err(e.into());
            }
        }

        let _ = async_fs::remove_file(self.record_path(id)).await;

        tracing::info!(id = %id, "deleted file");

        Ok(())
    }

    pub async fn storage_stats(&self) -> Result<StorageStats> {
        let mut total_size = 0;
        let mut file_count = 0;

        let mut entries = match async_fs::read_dir(&self.config.storage_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StorageStats {
                    total_size,
                    file_count,
                    storage_path: self.config.storage_path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                total_size += entry.metadata().await?.len();
                file_count += 1;
            }
        }

        Ok(StorageStats {
            total_size,
            file_count,
            storage_path: self.config.storage_path.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorageStats {
    pub total_size: u64,
    pub file_count: u64,
    pub storage_path: PathBuf,
}
