//! Transfer controller session.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{BucketError, Result};
use crate::events::{Notification, TransferEvent};
use crate::fs::registry::TransferRegistry;
use crate::fs::task::{Direction, TaskId, TransferTask};
use crate::http::HttpClient;
use crate::progress::TransferProgress;

/// Client session against one file manager backend.
///
/// All operations take `&self`, so one session can drive several transfers
/// at once (wrap it in an `Arc` to share it between tasks). Transfer
/// progress and outcomes are published as [`TransferEvent`]s; see
/// [`Session::take_events`].
///
/// # Example
/// ```no_run
/// use bucketlib::{ClientConfig, DirectoryPrefix, Session};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> bucketlib::Result<()> {
/// let mut session = Session::new(ClientConfig::new("http://localhost:5001"))?;
/// let mut events = session.take_events();
///
/// let report = session
///     .upload("video.mp4", &DirectoryPrefix::new("media/"), CancellationToken::new())
///     .await?;
/// println!("uploaded {} in {} chunks", report.target_path, report.chunks);
///
/// while let Ok(event) = events.try_recv() {
///     println!("{:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    /// API client for making requests
    pub(crate) api: ApiClient,
    config: ClientConfig,
    /// Active transfers
    pub(crate) transfers: TransferRegistry,
    events_tx: Option<mpsc::UnboundedSender<TransferEvent>>,
}

impl Session {
    /// Create a session from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::from_config(&config)?;
        Ok(Self {
            api: ApiClient::new(http),
            config,
            transfers: TransferRegistry::new(),
            events_tx: None,
        })
    }

    /// Create a session for `base_url` with default settings.
    pub fn connect(base_url: &str) -> Result<Self> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Subscribe to transfer events.
    ///
    /// Events are only produced once a receiver exists. Calling this again
    /// replaces the previous receiver, which then sees the channel close.
    pub fn take_events(&mut self) -> mpsc::UnboundedReceiver<TransferEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events_tx = Some(tx);
        rx
    }

    /// Snapshots of all in-flight transfers.
    pub fn transfers(&self) -> Vec<TransferTask> {
        self.transfers.active()
    }

    /// Snapshot of one in-flight transfer.
    pub fn transfer(&self, id: TaskId) -> Option<TransferTask> {
        self.transfers.get(id)
    }

    /// Cancel one transfer. Returns `false` if it is no longer running.
    pub fn cancel(&self, id: TaskId) -> bool {
        let found = self.transfers.cancel(id);
        if found {
            info!(task = %id, "cancellation requested");
        }
        found
    }

    /// Cancel every in-flight transfer.
    pub fn cancel_all(&self) {
        self.transfers.cancel_all();
    }

    /// Fetch a CSRF token from the backend and use it for later requests.
    pub async fn refresh_csrf_token(&self) -> Result<String> {
        self.api.fetch_csrf_token().await
    }

    /// Set the CSRF token supplied by the embedding page.
    pub fn set_csrf_token(&self, token: Option<String>) {
        self.api.http().set_csrf_token(token);
    }

    /// User notification for an event, using the configured dismiss interval.
    pub fn notification(&self, event: &TransferEvent) -> Option<Notification> {
        Notification::from_event(event).map(|n| n.with_ttl(self.config.notification_ttl()))
    }

    pub(crate) fn emit(&self, event: TransferEvent) {
        if let Some(tx) = &self.events_tx {
            // A dropped receiver just means nobody is listening
            let _ = tx.send(event);
        }
    }

    /// Register a transfer and announce it.
    pub(crate) fn begin_transfer(
        &self,
        direction: Direction,
        target_path: &str,
        total_bytes: Option<u64>,
        cancel: CancellationToken,
    ) -> TransferTask {
        let task = self
            .transfers
            .register(direction, target_path, total_bytes, cancel);
        info!(task = %task.id, path = %target_path, ?direction, "transfer started");
        self.emit(TransferEvent::Started {
            task: task.id,
            direction,
            target_path: target_path.to_string(),
            total: total_bytes,
        });
        task
    }

    /// Record progress and forward it.
    pub(crate) fn report_progress(&self, progress: TransferProgress) {
        let accepted = self
            .transfers
            .update(progress.task, |t| t.advance(progress.done))
            .unwrap_or(false);
        if accepted {
            self.emit(TransferEvent::Progress(progress));
        }
    }

    /// Mark a transfer completed and announce it.
    pub(crate) fn complete_transfer(&self, task: &TransferTask, bytes: u64) {
        self.transfers.update(task.id, |t| {
            t.advance(bytes);
            t.complete()
        });
        self.transfers.remove(task.id);
        info!(task = %task.id, path = %task.target_path, bytes, "transfer completed");

        let target_path = task.target_path.clone();
        self.emit(match task.direction {
            Direction::Upload => TransferEvent::UploadCompleted {
                task: task.id,
                target_path,
            },
            Direction::Download => TransferEvent::DownloadCompleted {
                task: task.id,
                target_path,
                bytes,
            },
        });
    }

    /// Mark a transfer cancelled or failed, depending on `error`, and announce it.
    pub(crate) fn abort_transfer(&self, task: &TransferTask, error: &BucketError) {
        let cancelled = error.is_cancelled();
        self.transfers.update(task.id, |t| {
            if cancelled { t.mark_cancelled() } else { t.fail() }
        });
        self.transfers.remove(task.id);

        let target_path = task.target_path.clone();
        let event = if cancelled {
            info!(task = %task.id, path = %target_path, "transfer cancelled");
            match task.direction {
                Direction::Upload => TransferEvent::UploadCancelled {
                    task: task.id,
                    target_path,
                },
                Direction::Download => TransferEvent::DownloadCancelled {
                    task: task.id,
                    target_path,
                },
            }
        } else {
            warn!(task = %task.id, path = %target_path, error = %error, "transfer failed");
            let reason = error.to_string();
            match task.direction {
                Direction::Upload => TransferEvent::UploadFailed {
                    task: task.id,
                    target_path,
                    reason,
                },
                Direction::Download => TransferEvent::DownloadFailed {
                    task: task.id,
                    target_path,
                    reason,
                },
            }
        };
        self.emit(event);
    }
}
