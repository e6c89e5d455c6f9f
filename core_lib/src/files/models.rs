use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::FileCategory;

/// A file as seen by API consumers. Reconstructed on demand from the
/// storage root; never held in memory across requests.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// Opaque identifier: the filename stem on disk. Allocated ids are
    /// UUIDs, but files placed under the root externally keep whatever
    /// stem they arrived with.
    pub id: String,
    /// Original client-supplied filename. Falls back to the on-disk name
    /// for files that have no metadata record.
    pub name: String,
    pub size: u64,
    pub category: FileCategory,
    pub upload_date: DateTime<Utc>,
    /// Declared content type from upload time, when a metadata record
    /// exists. Not part of the listing payload.
    #[serde(skip)]
    pub content_type: Option<String>,
    /// Server-local location, never exposed over the wire.
    #[serde(skip)]
    pub path: PathBuf,
}

/// An incoming file before it has an identity.
#[derive(Debug)]
pub struct FileUpload {
    pub original_filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Sidecar metadata record written next to the content at save time.
/// Persists what the filename alone cannot carry: the display name, the
/// declared content type and the upload instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub original_filename: String,
    pub content_type: String,
    pub category: FileCategory,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}
