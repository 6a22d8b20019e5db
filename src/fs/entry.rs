//! Listing entries returned by the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::api::error::is_not_configured_message;
use crate::error::{BucketError, Result};

/// One item in a listing.
///
/// Names are object keys as the backend reports them. Folder keys end in `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    /// Folder (common key prefix)
    Folder {
        /// Folder key
        name: String,
    },
    /// Stored object
    File {
        /// Object key
        name: String,
        /// Size in bytes
        #[serde(default)]
        size: u64,
        /// MIME type guessed by the backend
        #[serde(default)]
        mime_type: Option<String>,
        /// Pre-signed preview URL for previewable types
        #[serde(default)]
        preview_url: Option<String>,
    },
}

/// How an entry can be previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// `image/*`
    Image,
    /// `application/pdf`
    Pdf,
    /// `video/*`
    Video,
}

impl PreviewKind {
    /// Classify a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(PreviewKind::Image)
        } else if mime == "application/pdf" {
            Some(PreviewKind::Pdf)
        } else if mime.starts_with("video/") {
            Some(PreviewKind::Video)
        } else {
            None
        }
    }
}

impl Entry {
    /// Create a folder entry.
    pub fn folder(name: impl Into<String>) -> Self {
        Entry::Folder { name: name.into() }
    }

    /// Create a file entry without preview data.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Entry::File {
            name: name.into(),
            size,
            mime_type: None,
            preview_url: None,
        }
    }

    /// Full key of this entry.
    pub fn name(&self) -> &str {
        match self {
            Entry::Folder { name } | Entry::File { name, .. } => name,
        }
    }

    /// Last path segment, without the folder's trailing slash.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name().trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Check if this entry is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Entry::Folder { .. })
    }

    /// Check if this entry is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File { .. })
    }

    /// File size, `None` for folders.
    pub fn size(&self) -> Option<u64> {
        match self {
            Entry::File { size, .. } => Some(*size),
            Entry::Folder { .. } => None,
        }
    }

    /// Preview kind, if the entry has both a previewable type and a URL.
    pub fn preview(&self) -> Option<(PreviewKind, &str)> {
        match self {
            Entry::File {
                mime_type: Some(mime),
                preview_url: Some(url),
                ..
            } => PreviewKind::from_mime(mime).map(|kind| (kind, url.as_str())),
            _ => None,
        }
    }
}

/// Outcome of a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Ordinary listing
    Entries(Vec<Entry>),
    /// The backend has no storage configured
    NotConfigured,
}

impl Listing {
    /// Entries of an ordinary listing, empty for the not-configured state.
    pub fn entries(&self) -> &[Entry] {
        match self {
            Listing::Entries(entries) => entries,
            Listing::NotConfigured => &[],
        }
    }

    /// Check for the not-configured state.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Listing::NotConfigured)
    }

    /// Decode a `/list` response body.
    ///
    /// Entries that do not decode are skipped with a warning.
    pub fn from_response(response: &Value) -> Result<Self> {
        let message = response.get("message").and_then(|v| v.as_str());
        let files = response.get("files").and_then(|v| v.as_array());

        if message.is_some_and(is_not_configured_message)
            && files.is_none_or(|files| files.is_empty())
        {
            return Ok(Listing::NotConfigured);
        }

        let files = files.ok_or_else(|| {
            BucketError::InvalidResponse("listing has no files array".to_string())
        })?;

        let mut entries = Vec::with_capacity(files.len());
        for item in files {
            match serde_json::from_value::<Entry>(item.clone()) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, item = %item, "skipping malformed listing entry"),
            }
        }
        Ok(Listing::Entries(entries))
    }
}

/// Format a byte count for display (`512 Bytes`, `1.5 KB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let rounded = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rounded, UNITS[unit])
}
