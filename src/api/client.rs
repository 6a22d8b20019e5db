//! Backend API client, one method per endpoint.

use reqwest::Response;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{BucketError, Result};
use crate::http::HttpClient;

/// Metadata sent alongside one chunk of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRequest<'a> {
    /// Destination object key (prefix + file name)
    pub filename: &'a str,
    /// Declared size of the whole file
    pub file_size: u64,
    /// Zero-based chunk index
    pub chunk_number: u32,
    /// Number of chunks in this upload
    pub total_chunks: u32,
    /// Upload session id, absent on chunk 0
    pub upload_id: Option<&'a str>,
}

/// Backend acknowledgement of one chunk.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChunkAck {
    /// Upload session id (returned for chunk 0 of a multi-chunk upload)
    #[serde(default)]
    pub upload_id: Option<String>,
    /// Informational message
    #[serde(default)]
    pub message: Option<String>,
}

/// Percent-encode an object key as a single path component.
pub fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

/// Client for the file manager backend.
#[derive(Debug)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    /// Create a new API client over an HTTP client.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Underlying HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Send one chunk to `/upload_chunk`.
    pub async fn upload_chunk(&self, chunk: &ChunkRequest<'_>, data: Vec<u8>) -> Result<ChunkAck> {
        let part = Part::bytes(data)
            .file_name(file_name_of(chunk.filename).to_string())
            .mime_str("application/octet-stream")?;

        let mut form = Form::new()
            .part("chunk", part)
            .text("filename", chunk.filename.to_string())
            .text("file_size", chunk.file_size.to_string())
            .text("chunk_number", chunk.chunk_number.to_string())
            .text("total_chunks", chunk.total_chunks.to_string());
        if let Some(upload_id) = chunk.upload_id {
            form = form.text("upload_id", upload_id.to_string());
        }

        let response = self.http.post_multipart("/upload_chunk", form).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Upload a whole file through the form endpoint `/upload`.
    pub async fn upload_form(&self, folder: &str, file_name: &str, data: Vec<u8>) -> Result<Value> {
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", part)
            .text("folder", folder.to_string());
        self.http.post_multipart("/upload", form).await
    }

    /// Fetch the raw listing under `prefix`.
    pub async fn list(&self, prefix: &str) -> Result<Value> {
        self.http.get_json("/list", &[("prefix", prefix)]).await
    }

    /// Open a download stream for `key`.
    pub async fn download(&self, key: &str) -> Result<Response> {
        self.http
            .get_stream(&format!("/download/{}", encode_key(key)))
            .await
    }

    /// Delete one object.
    pub async fn delete(&self, key: &str) -> Result<Value> {
        self.http.delete(&format!("/delete/{}", encode_key(key))).await
    }

    /// Delete a folder and everything under it.
    pub async fn delete_folder(&self, key: &str) -> Result<Value> {
        self.http
            .delete(&format!("/delete_folder/{}", encode_key(key)))
            .await
    }

    /// Create a folder. `folder_name` is the full key without trailing slash.
    pub async fn create_folder(&self, folder_name: &str) -> Result<Value> {
        self.http
            .post_json("/create_folder", &json!({ "folder_name": folder_name }))
            .await
    }

    /// Request a share link for `key`.
    pub async fn share(&self, key: &str) -> Result<String> {
        let response = self
            .http
            .get_json(&format!("/share/{}", encode_key(key)), &[])
            .await?;
        response
            .get("url")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| BucketError::InvalidResponse("share response has no url".to_string()))
    }

    /// Fetch a fresh CSRF token and store it for later requests.
    pub async fn fetch_csrf_token(&self) -> Result<String> {
        let response = self.http.get_json("/get-csrf-token", &[]).await?;
        let token = response
            .get("csrf_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BucketError::InvalidResponse("missing csrf_token".to_string()))?
            .to_string();
        self.http.set_csrf_token(Some(token.clone()));
        Ok(token)
    }
}

/// Last segment of an object key.
fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
