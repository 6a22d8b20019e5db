//! Progress reporting for file transfers.

use crate::fs::chunks::ChunkDescriptor;
use crate::fs::task::TaskId;

/// Progress information for uploads and downloads.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    /// Task this report belongs to
    pub task: TaskId,
    /// Remote object key
    pub filename: String,
    /// Bytes transferred so far
    pub done: u64,
    /// Total bytes, if known
    pub total: Option<u64>,
    /// Completion percentage (0.0 to 100.0), if known
    pub percent: Option<f64>,
}

impl TransferProgress {
    /// Progress measured in bytes. The percentage is only set when the total is known.
    pub fn from_bytes(task: TaskId, filename: impl Into<String>, done: u64, total: Option<u64>) -> Self {
        let percent = match total {
            Some(0) | None => None,
            Some(total) => Some((done as f64 / total as f64 * 100.0).min(100.0)),
        };
        Self {
            task,
            filename: filename.into(),
            done,
            total,
            percent,
        }
    }

    /// Progress after a chunk has been acknowledged.
    ///
    /// The percentage counts chunks, not bytes.
    pub fn after_chunk(
        task: TaskId,
        filename: impl Into<String>,
        chunk: &ChunkDescriptor,
        file_size: u64,
    ) -> Self {
        Self {
            task,
            filename: filename.into(),
            done: chunk.offset + chunk.length,
            total: Some(file_size),
            percent: Some(chunk.percent_after()),
        }
    }

    /// Check if transfer is complete.
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.done >= total)
    }
}
