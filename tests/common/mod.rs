//! In-process mock of the file manager backend.
//!
//! Records every request so tests can assert on what the client sent.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use bucketlib::{ClientConfig, Session, TransferEvent};

/// Upload id handed out for chunk 0 of multi-chunk uploads.
pub const UPLOAD_ID: &str = "upload-7f3a";

/// Token handed out by `/get-csrf-token`.
pub const SERVER_CSRF_TOKEN: &str = "csrf-from-server";

/// One `/upload_chunk` request as the server saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChunk {
    pub filename: String,
    pub file_size: u64,
    pub chunk_number: u32,
    pub total_chunks: u32,
    pub upload_id: Option<String>,
    pub data: Vec<u8>,
    pub csrf_field: Option<String>,
    pub csrf_header: Option<String>,
}

/// How `/download` serves bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Whole body with `Content-Length`
    Sized,
    /// Chunked body in small blocks, no `Content-Length`
    Unsized,
    /// First block, then the body never ends
    Stall,
}

pub struct MockState {
    pub chunks: Mutex<Vec<RecordedChunk>>,
    pub form_uploads: Mutex<Vec<(String, String, Vec<u8>)>>,
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub listing: Mutex<Value>,
    pub list_requests: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub deleted_folders: Mutex<Vec<String>>,
    pub created_folders: Mutex<Vec<String>>,
    pub fail_chunk: Mutex<Option<u32>>,
    pub cancel_on_chunk: Mutex<Option<(u32, CancellationToken)>>,
    pub omit_upload_id: AtomicBool,
    pub download_mode: Mutex<DownloadMode>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
            form_uploads: Mutex::new(Vec::new()),
            objects: Mutex::new(BTreeMap::new()),
            listing: Mutex::new(json!({"files": []})),
            list_requests: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            deleted_folders: Mutex::new(Vec::new()),
            created_folders: Mutex::new(Vec::new()),
            fail_chunk: Mutex::new(None),
            cancel_on_chunk: Mutex::new(None),
            omit_upload_id: AtomicBool::new(false),
            download_mode: Mutex::new(DownloadMode::Sized),
        }
    }
}

impl MockState {
    pub fn chunks(&self) -> Vec<RecordedChunk> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn set_listing(&self, listing: Value) {
        *self.listing.lock().unwrap() = listing;
    }

    pub fn put_object(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

pub struct MockServer {
    pub url: String,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockServer {
    /// Session against this server with the given chunk size.
    pub fn session(&self, chunk_size: u64) -> Session {
        Session::new(ClientConfig::new(&self.url).with_chunk_size(chunk_size)).unwrap()
    }
}

/// Start a mock backend on an ephemeral port.
pub async fn spawn() -> MockServer {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/upload_chunk", post(upload_chunk))
        .route("/upload", post(upload_form))
        .route("/list", get(list))
        .route("/download/:key", get(download))
        .route("/delete/:key", delete(delete_file))
        .route("/delete_folder/:key", delete(delete_folder))
        .route("/create_folder", post(create_folder))
        .route("/share/:key", get(share))
        .route("/get-csrf-token", get(csrf_token))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        url: format!("http://{}", addr),
        state,
        handle,
    }
}

/// Drain all events that are currently queued.
pub fn drain(events: &mut tokio::sync::mpsc::UnboundedReceiver<TransferEvent>) -> Vec<TransferEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

async fn upload_chunk(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut data = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        if name == "chunk" {
            data = field.bytes().await.unwrap().to_vec();
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }

    let recorded = RecordedChunk {
        filename: fields.get("filename").cloned().unwrap_or_default(),
        file_size: fields["file_size"].parse().unwrap(),
        chunk_number: fields["chunk_number"].parse().unwrap(),
        total_chunks: fields["total_chunks"].parse().unwrap(),
        upload_id: fields.get("upload_id").cloned(),
        data,
        csrf_field: fields.get("csrf_token").cloned(),
        csrf_header: header_value(&headers, "x-csrftoken"),
    };
    state.chunks.lock().unwrap().push(recorded.clone());

    if let Some((at, token)) = state.cancel_on_chunk.lock().unwrap().as_ref() {
        if *at == recorded.chunk_number {
            token.cancel();
        }
    }

    if *state.fail_chunk.lock().unwrap() == Some(recorded.chunk_number) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Chunk write failed"})),
        )
            .into_response();
    }

    {
        let mut objects = state.objects.lock().unwrap();
        let object = objects.entry(recorded.filename.clone()).or_default();
        if recorded.chunk_number == 0 {
            object.clear();
        }
        object.extend_from_slice(&recorded.data);
    }

    let multi = recorded.total_chunks > 1;
    if recorded.chunk_number == 0 && multi && !state.omit_upload_id.load(Ordering::SeqCst) {
        return Json(json!({"upload_id": UPLOAD_ID})).into_response();
    }
    if recorded.chunk_number + 1 == recorded.total_chunks {
        return Json(json!({"message": "File uploaded successfully"})).into_response();
    }
    Json(json!({"message": "Chunk received"})).into_response()
}

async fn upload_form(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    let mut folder = String::new();
    let mut file_name = String::new();
    let mut data = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or("") {
            "file" => {
                file_name = field.file_name().unwrap_or("").to_string();
                data = field.bytes().await.unwrap().to_vec();
            }
            "folder" => folder = field.text().await.unwrap(),
            _ => {}
        }
    }

    if file_name.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "No selected file"}))).into_response();
    }
    state.form_uploads.lock().unwrap().push((folder, file_name, data));
    Json(json!({"message": "File uploaded successfully"})).into_response()
}

async fn list(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let prefix = query.get("prefix").cloned().unwrap_or_default();
    state.list_requests.lock().unwrap().push(prefix);
    let listing = state.listing.lock().unwrap().clone();
    Json(listing).into_response()
}

async fn download(State(state): State<Arc<MockState>>, Path(key): Path<String>) -> Response {
    let Some(data) = state.object(&key) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "File not found"}))).into_response();
    };

    let mode = *state.download_mode.lock().unwrap();
    match mode {
        DownloadMode::Sized => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response(),
        DownloadMode::Unsized => {
            let blocks: Vec<Result<Vec<u8>, std::io::Error>> =
                data.chunks(4).map(|c| Ok(c.to_vec())).collect();
            Body::from_stream(futures::stream::iter(blocks)).into_response()
        }
        DownloadMode::Stall => {
            let first: Vec<Result<Vec<u8>, std::io::Error>> = vec![Ok(data)];
            let stream = futures::StreamExt::chain(
                futures::stream::iter(first),
                futures::stream::pending::<Result<Vec<u8>, std::io::Error>>(),
            );
            Body::from_stream(stream).into_response()
        }
    }
}

async fn delete_file(State(state): State<Arc<MockState>>, Path(key): Path<String>) -> Response {
    if state.objects.lock().unwrap().remove(&key).is_none() {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "File not found"}))).into_response();
    }
    state.deleted.lock().unwrap().push(key);
    Json(json!({"message": "File deleted successfully"})).into_response()
}

async fn delete_folder(State(state): State<Arc<MockState>>, Path(key): Path<String>) -> Response {
    state.deleted_folders.lock().unwrap().push(key);
    Json(json!({"message": "Folder deleted successfully"})).into_response()
}

async fn create_folder(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let Some(name) = body.get("folder_name").and_then(|v| v.as_str()) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Folder name is required"})))
            .into_response();
    };
    state.created_folders.lock().unwrap().push(name.to_string());
    Json(json!({"message": "Folder created successfully"})).into_response()
}

async fn share(Path(key): Path<String>) -> Response {
    Json(json!({"url": format!("https://share.example/{}?expires=604800", key)})).into_response()
}

async fn csrf_token() -> Response {
    (
        [("X-CSRF-Token", SERVER_CSRF_TOKEN)],
        Json(json!({"csrf_token": SERVER_CSRF_TOKEN})),
    )
        .into_response()
}
