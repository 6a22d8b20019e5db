//! Listing entries, transfer bookkeeping and session operations.

pub mod chunks;
pub mod entry;
mod operations;
pub mod registry;
pub mod task;

pub use chunks::{ChunkDescriptor, ChunkPlan, plan_chunks};
pub use entry::{Entry, Listing, PreviewKind, format_file_size};
pub use operations::{DownloadedFile, UploadReport};
pub use registry::TransferRegistry;
pub use task::{Direction, TaskId, TransferState, TransferTask};
