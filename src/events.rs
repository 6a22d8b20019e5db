//! Transfer events and user notifications.

use std::time::Duration;

use crate::config::DEFAULT_NOTIFICATION_TTL_MS;
use crate::error::BucketError;
use crate::fs::task::{Direction, TaskId};
use crate::progress::TransferProgress;

/// Event emitted by a [`Session`](crate::Session) while transfers run.
///
/// Events of one task arrive in order. Events of independent tasks interleave.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// A transfer was registered.
    Started {
        task: TaskId,
        direction: Direction,
        target_path: String,
        total: Option<u64>,
    },
    /// Progress of a running transfer.
    Progress(TransferProgress),
    UploadCompleted {
        task: TaskId,
        target_path: String,
    },
    UploadFailed {
        task: TaskId,
        target_path: String,
        reason: String,
    },
    UploadCancelled {
        task: TaskId,
        target_path: String,
    },
    DownloadCompleted {
        task: TaskId,
        target_path: String,
        bytes: u64,
    },
    DownloadFailed {
        task: TaskId,
        target_path: String,
        reason: String,
    },
    DownloadCancelled {
        task: TaskId,
        target_path: String,
    },
    /// The listing of `prefix` changed and should be fetched again.
    RefreshListing { prefix: String },
}

impl TransferEvent {
    /// Task the event belongs to, if any.
    pub fn task(&self) -> Option<TaskId> {
        match self {
            TransferEvent::Started { task, .. }
            | TransferEvent::UploadCompleted { task, .. }
            | TransferEvent::UploadFailed { task, .. }
            | TransferEvent::UploadCancelled { task, .. }
            | TransferEvent::DownloadCompleted { task, .. }
            | TransferEvent::DownloadFailed { task, .. }
            | TransferEvent::DownloadCancelled { task, .. } => Some(*task),
            TransferEvent::Progress(progress) => Some(progress.task),
            TransferEvent::RefreshListing { .. } => None,
        }
    }

    /// Check if this event ends its task.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferEvent::UploadCompleted { .. }
                | TransferEvent::UploadFailed { .. }
                | TransferEvent::UploadCancelled { .. }
                | TransferEvent::DownloadCompleted { .. }
                | TransferEvent::DownloadFailed { .. }
                | TransferEvent::DownloadCancelled { .. }
        )
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// Transient message for the user, dismissed after `dismiss_after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub dismiss_after: Duration,
}

impl Notification {
    /// Create a notification with the default dismiss interval.
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            dismiss_after: Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error)
    }

    /// Override the dismiss interval.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.dismiss_after = ttl;
        self
    }

    /// Notification for a terminal transfer event.
    ///
    /// Progress, start and refresh events, as well as finished downloads,
    /// produce nothing.
    pub fn from_event(event: &TransferEvent) -> Option<Self> {
        match event {
            TransferEvent::UploadCompleted { .. } => {
                Some(Self::success("File uploaded successfully"))
            }
            TransferEvent::UploadFailed { reason, .. } => {
                Some(Self::error(format!("Error uploading file: {}", reason)))
            }
            TransferEvent::UploadCancelled { .. } => Some(Self::info("Upload cancelled")),
            TransferEvent::DownloadFailed { .. } => Some(Self::error("Error downloading file")),
            TransferEvent::DownloadCancelled { .. } => Some(Self::info("Download cancelled")),
            _ => None,
        }
    }

    /// Notification for a failed operation.
    pub fn from_error(error: &BucketError) -> Self {
        match error {
            BucketError::NotConfigured => {
                Self::info("Storage not configured. Please configure a storage provider.")
            }
            BucketError::Cancelled => Self::info("Operation cancelled"),
            other => Self::error(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_notifications() {
        let done = TransferEvent::UploadCompleted {
            task: TaskId(1),
            target_path: "a.txt".to_string(),
        };
        let n = Notification::from_event(&done).unwrap();
        assert_eq!(n.message, "File uploaded successfully");
        assert_eq!(n.level, NotificationLevel::Success);
        assert_eq!(n.dismiss_after, Duration::from_secs(5));

        let failed = TransferEvent::UploadFailed {
            task: TaskId(1),
            target_path: "a.txt".to_string(),
            reason: "HTTP error! status: 500".to_string(),
        };
        assert_eq!(
            Notification::from_event(&failed).unwrap().message,
            "Error uploading file: HTTP error! status: 500"
        );
    }

    #[test]
    fn test_download_notifications() {
        let cancelled = TransferEvent::DownloadCancelled {
            task: TaskId(3),
            target_path: "a.txt".to_string(),
        };
        let n = Notification::from_event(&cancelled).unwrap();
        assert_eq!(n.message, "Download cancelled");
        assert_eq!(n.level, NotificationLevel::Info);

        let completed = TransferEvent::DownloadCompleted {
            task: TaskId(3),
            target_path: "a.txt".to_string(),
            bytes: 10,
        };
        assert!(Notification::from_event(&completed).is_none());
        assert!(completed.is_terminal());
    }

    #[test]
    fn test_non_terminal_events() {
        let refresh = TransferEvent::RefreshListing {
            prefix: "docs/".to_string(),
        };
        assert_eq!(refresh.task(), None);
        assert!(!refresh.is_terminal());
        assert!(Notification::from_event(&refresh).is_none());
    }

    #[test]
    fn test_from_error() {
        let n = Notification::from_error(&BucketError::HttpError(404));
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.message, "HTTP error! status: 404");

        let n = Notification::from_error(&BucketError::NotConfigured)
            .with_ttl(Duration::from_secs(1));
        assert_eq!(n.level, NotificationLevel::Info);
        assert_eq!(n.dismiss_after, Duration::from_secs(1));
    }
}
