//! Upload operations.

use std::io::SeekFrom;
use std::path::Path;

use futures::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, Cursor};
use tokio_util::compat::TokioAsyncReadCompatExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::ChunkRequest;
use crate::error::{BucketError, Result};
use crate::events::TransferEvent;
use crate::fs::chunks::{ChunkDescriptor, ChunkPlan, plan_chunks};
use crate::fs::task::{Direction, TaskId, TransferTask};
use crate::progress::TransferProgress;
use crate::session::{DirectoryPrefix, Session};

/// Result of a finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Task that performed the upload
    pub task: TaskId,
    /// Object key written (prefix + name)
    pub target_path: String,
    /// Uploaded size in bytes
    pub size: u64,
    /// Number of chunk requests sent
    pub chunks: u32,
    /// Server upload session id, if one was issued
    pub upload_id: Option<String>,
}

impl Session {
    /// Upload a local file into `prefix`.
    ///
    /// Files at or above the configured chunk size are sent as sequential
    /// chunks; smaller files go out in a single request.
    ///
    /// # Arguments
    /// * `local_path` - Path to the local file to upload
    /// * `prefix` - Remote folder to upload into
    /// * `cancel` - Stops the upload at the next chunk boundary
    pub async fn upload<P: AsRef<Path>>(
        &self,
        local_path: P,
        prefix: &DirectoryPrefix,
        cancel: CancellationToken,
    ) -> Result<UploadReport> {
        let path = local_path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| BucketError::Custom(format!("Invalid file path: {}", path.display())))?
            .to_string_lossy()
            .to_string();

        let file = tokio::fs::File::open(path).await?;
        let file_size = file.metadata().await?.len();

        self.upload_from_reader(file.compat(), &file_name, file_size, prefix, cancel)
            .await
    }

    /// Upload an in-memory buffer into `prefix` as `file_name`.
    ///
    /// # Example
    /// ```no_run
    /// # use bucketlib::{DirectoryPrefix, Session};
    /// # use tokio_util::sync::CancellationToken;
    /// # async fn example() -> bucketlib::Result<()> {
    /// let session = Session::connect("http://localhost:5001")?;
    /// let report = session
    ///     .upload_from_bytes(b"hello", "hello.txt", &DirectoryPrefix::root(), CancellationToken::new())
    ///     .await?;
    /// assert_eq!(report.chunks, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_from_bytes(
        &self,
        data: &[u8],
        file_name: &str,
        prefix: &DirectoryPrefix,
        cancel: CancellationToken,
    ) -> Result<UploadReport> {
        self.upload_from_reader(Cursor::new(data), file_name, data.len() as u64, prefix, cancel)
            .await
    }

    /// Upload `file_size` bytes read from an async reader.
    ///
    /// The reader is positioned at each chunk's offset before the chunk is read.
    pub async fn upload_from_reader<R>(
        &self,
        mut reader: R,
        file_name: &str,
        file_size: u64,
        prefix: &DirectoryPrefix,
        cancel: CancellationToken,
    ) -> Result<UploadReport>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        if file_name.is_empty() {
            return Err(BucketError::Custom("File name must not be empty".to_string()));
        }

        let target_path = prefix.join(file_name);
        let plan = plan_chunks(file_size, self.config().chunk_size)?;
        let task = self.begin_transfer(Direction::Upload, &target_path, Some(file_size), cancel.clone());

        match self.send_chunks(&mut reader, &task, plan, file_size, &cancel).await {
            Ok(upload_id) => {
                self.complete_transfer(&task, file_size);
                self.emit(TransferEvent::RefreshListing {
                    prefix: prefix.to_string(),
                });
                Ok(UploadReport {
                    task: task.id,
                    target_path,
                    size: file_size,
                    chunks: plan.len(),
                    upload_id,
                })
            }
            Err(e) => {
                self.abort_transfer(&task, &e);
                Err(e)
            }
        }
    }

    /// Upload a whole buffer through the form endpoint, without chunking.
    ///
    /// The backend stores it as `folder + file_name`.
    pub async fn upload_via_form(
        &self,
        data: Vec<u8>,
        file_name: &str,
        prefix: &DirectoryPrefix,
    ) -> Result<String> {
        let target_path = prefix.join(file_name);
        self.api
            .upload_form(prefix.as_str(), file_name, data)
            .await?;
        self.emit(TransferEvent::RefreshListing {
            prefix: prefix.to_string(),
        });
        Ok(target_path)
    }

    /// Send the planned chunks in order, one at a time.
    ///
    /// Returns the upload id issued in response to chunk 0, if any.
    async fn send_chunks<R>(
        &self,
        reader: &mut R,
        task: &TransferTask,
        plan: ChunkPlan,
        file_size: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<String>>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        let mut upload_id: Option<String> = None;

        for chunk in plan.iter() {
            if cancel.is_cancelled() {
                return Err(BucketError::Cancelled);
            }

            let data = read_chunk(reader, &chunk).await?;
            debug!(
                task = %task.id,
                chunk = chunk.index,
                total = chunk.total_chunks,
                len = chunk.length,
                "sending chunk"
            );

            let request = ChunkRequest {
                filename: &task.target_path,
                file_size,
                chunk_number: chunk.index,
                total_chunks: chunk.total_chunks,
                upload_id: upload_id.as_deref(),
            };
            let ack = self.api.upload_chunk(&request, data).await?;

            if chunk.index == 0 {
                upload_id = ack.upload_id;
                if upload_id.is_none() && chunk.total_chunks > 1 {
                    return Err(BucketError::InvalidResponse(
                        "first chunk response has no upload_id".to_string(),
                    ));
                }
            }

            self.report_progress(TransferProgress::after_chunk(
                task.id,
                &task.target_path,
                &chunk,
                file_size,
            ));
        }

        Ok(upload_id)
    }
}

async fn read_chunk<R>(reader: &mut R, chunk: &ChunkDescriptor) -> Result<Vec<u8>>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let len = usize::try_from(chunk.length)
        .map_err(|_| BucketError::Custom(format!("Chunk too large: {} bytes", chunk.length)))?;
    let mut buffer = vec![0u8; len];
    reader.seek(SeekFrom::Start(chunk.offset)).await?;
    reader.read_exact(&mut buffer).await?;
    Ok(buffer)
}
