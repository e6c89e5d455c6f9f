//! Coarse file classification used for listings and upload metadata.

use serde::{Deserialize, Serialize};

/// Coarse semantic category of a stored file.
///
/// The wire values (`image`, `application/pdf`, `text`, `document`,
/// `unknown`) are part of the JSON API and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileCategory {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "document")]
    Document,
    #[serde(rename = "unknown")]
    Unknown,
}

impl FileCategory {
    /// Classifies by file extension (without the leading dot, any case).
    ///
    /// Used as a fallback for files on disk that carry no metadata record.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" => FileCategory::Image,
            "pdf" => FileCategory::Pdf,
            "txt" => FileCategory::Text,
            "doc" | "docx" => FileCategory::Document,
            _ => FileCategory::Unknown,
        }
    }

    /// Classifies by declared content type. This is the canonical
    /// derivation, computed once at upload time and persisted.
    pub fn from_content_type(content_type: &str) -> Self {
        let Ok(mime) = content_type.parse::<mime::Mime>() else {
            return FileCategory::Unknown;
        };

        match (mime.type_(), mime.subtype()) {
            (mime::IMAGE, _) => FileCategory::Image,
            (mime::APPLICATION, mime::PDF) => FileCategory::Pdf,
            (mime::TEXT, mime::PLAIN) => FileCategory::Text,
            (mime::APPLICATION, subtype)
                if subtype == "msword"
                    || subtype == "vnd.openxmlformats-officedocument.wordprocessingml.document" =>
            {
                FileCategory::Document
            }
            _ => FileCategory::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "application/pdf",
            FileCategory::Text => "text",
            FileCategory::Document => "document",
            FileCategory::Unknown => "unknown",
        }
    }
}
