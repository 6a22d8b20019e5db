//! # bucketlib
//!
//! Async Rust client for an S3-backed file manager backend.
//!
//! ## Features
//!
//! - **Uploads**:
//!   - Single request for small files, sequential chunks (100 MiB by default) for large ones.
//!   - Sources: local paths, byte buffers, or any `AsyncRead + AsyncSeek` reader.
//!   - Cancellation at chunk boundaries via `CancellationToken`.
//! - **Downloads**:
//!   - Streamed body with progress whenever the size is declared.
//!   - In-memory result or temp-file-then-rename to disk.
//! - **Browsing**:
//!   - Prefix-based listing over the flat object namespace.
//!   - Folder navigation, local hide/show of entries, size formatting, preview kinds.
//! - **Management**: create and delete folders, delete files, create share links.
//! - **Events**: progress and outcomes over a channel, convertible into user notifications.
//!
//! ## Example
//!
//! ```no_run
//! use bucketlib::{ClientConfig, Session, SessionState};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> bucketlib::Result<()> {
//! let session = Session::new(ClientConfig::new("http://localhost:5001").apply_env()?)?;
//! let mut state = SessionState::new();
//!
//! // List the root and descend into a folder
//! let listing = session.refresh(&state).await?;
//! for row in state.render(listing.entries()) {
//!     println!("{} {}", row.label, row.detail.unwrap_or_default());
//! }
//! session.navigate_into(&mut state, "docs/").await?;
//!
//! // Upload into the current folder
//! let report = session
//!     .upload("report.pdf", state.prefix(), CancellationToken::new())
//!     .await?;
//! println!("stored as {}", report.target_path);
//!
//! // Download it again
//! let file = session
//!     .download(&report.target_path, CancellationToken::new())
//!     .await?;
//! println!("{} bytes", file.data.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod http;
pub mod progress;
pub mod session;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{BucketError, ErrorKind, Result};
pub use events::{Notification, NotificationLevel, TransferEvent};
pub use fs::{
    ChunkDescriptor, ChunkPlan, Direction, DownloadedFile, Entry, Listing, PreviewKind, TaskId,
    TransferState, TransferTask, UploadReport, format_file_size,
};
pub use progress::TransferProgress;
pub use session::{DirectoryPrefix, ListedEntry, Session, SessionState};
pub use tokio_util::sync::CancellationToken;
