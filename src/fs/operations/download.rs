//! Download operations.

use std::path::Path;

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{BucketError, Result};
use crate::fs::task::{Direction, TaskId, TransferTask};
use crate::progress::TransferProgress;
use crate::session::Session;

/// A fully received object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Task that performed the download
    pub task: TaskId,
    /// Object key
    pub key: String,
    /// Suggested local file name (last key segment)
    pub name: String,
    /// Object content
    pub data: Vec<u8>,
}

impl Session {
    /// Download one object into memory.
    ///
    /// The body is read block by block. Progress events are only sent when
    /// the response declares a `Content-Length`. Cancelling `cancel` before
    /// the body ends stops reading and returns [`BucketError::Cancelled`].
    ///
    /// # Arguments
    /// * `key` - Full object key
    /// * `cancel` - Cancellation handle
    pub async fn download(&self, key: &str, cancel: CancellationToken) -> Result<DownloadedFile> {
        let task = self.begin_transfer(Direction::Download, key, None, cancel.clone());
        let mut data = Vec::new();

        match self.receive(&task, &cancel, &mut data).await {
            Ok(_) => {
                self.complete_transfer(&task, data.len() as u64);
                Ok(DownloadedFile {
                    task: task.id,
                    key: key.to_string(),
                    name: key.rsplit('/').next().unwrap_or(key).to_string(),
                    data,
                })
            }
            Err(e) => {
                self.abort_transfer(&task, &e);
                Err(e)
            }
        }
    }

    /// Download one object to a local path.
    ///
    /// Blocks are written to a temporary file next to the target as they
    /// arrive, and the file is renamed into place once complete. On any
    /// failure or cancellation the temporary file is removed, so nothing
    /// partial is ever left at `local_path`.
    ///
    /// # Returns
    /// Number of bytes written
    pub async fn download_to_file<P: AsRef<Path>>(
        &self,
        key: &str,
        local_path: P,
        cancel: CancellationToken,
    ) -> Result<u64> {
        let target_path = local_path.as_ref();
        let file_name = target_path
            .file_name()
            .ok_or_else(|| {
                BucketError::Custom(format!("Invalid target path: {}", target_path.display()))
            })?
            .to_string_lossy()
            .to_string();
        let parent_dir = target_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let temp_path = parent_dir.join(format!(".{}.part", file_name));

        let task = self.begin_transfer(Direction::Download, key, None, cancel.clone());

        match self
            .receive_to_file(&task, &cancel, &temp_path, target_path)
            .await
        {
            Ok(written) => {
                self.complete_transfer(&task, written);
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                self.abort_transfer(&task, &e);
                Err(e)
            }
        }
    }

    async fn receive_to_file(
        &self,
        task: &TransferTask,
        cancel: &CancellationToken,
        temp_path: &Path,
        target_path: &Path,
    ) -> Result<u64> {
        let file = tokio::fs::File::create(temp_path).await?;
        let mut writer = BufWriter::new(file);

        let written = self.receive(task, cancel, &mut writer).await?;
        writer.flush().await?;
        drop(writer);

        tokio::fs::rename(temp_path, target_path).await?;
        Ok(written)
    }

    /// Stream the body of `task`'s object into `sink`.
    ///
    /// Returns the number of bytes received.
    async fn receive<W>(
        &self,
        task: &TransferTask,
        cancel: &CancellationToken,
        sink: &mut W,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BucketError::Cancelled),
            response = self.api.download(&task.target_path) => response?,
        };

        let declared = response.content_length();
        self.transfers.update(task.id, |t| t.set_total(declared));
        debug!(task = %task.id, declared = ?declared, "download body started");

        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();

        loop {
            let block = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BucketError::Cancelled),
                block = stream.next() => block,
            };
            let Some(block) = block else {
                break;
            };
            let block = block?;
            sink.write_all(&block).await?;
            received += block.len() as u64;

            if declared.is_some() {
                self.report_progress(TransferProgress::from_bytes(
                    task.id,
                    &task.target_path,
                    received,
                    declared,
                ));
            }
        }

        Ok(received)
    }
}
