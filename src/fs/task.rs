//! Transfer task state.

use std::fmt;

use tokio_util::sync::CancellationToken;

/// Identifier of a transfer within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

/// Lifecycle of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl TransferState {
    /// Check if no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Completed | TransferState::Cancelled | TransferState::Failed
        )
    }
}

/// One upload or download.
///
/// State only moves forward: once terminal, every mutation is ignored.
/// `transferred_bytes` never decreases and never exceeds a known total.
#[derive(Debug, Clone)]
pub struct TransferTask {
    /// Task identifier
    pub id: TaskId,
    /// Upload or download
    pub direction: Direction,
    /// Remote object key
    pub target_path: String,
    total_bytes: Option<u64>,
    transferred_bytes: u64,
    state: TransferState,
    cancel: CancellationToken,
}

impl TransferTask {
    /// Create a pending task.
    pub fn new(
        id: TaskId,
        direction: Direction,
        target_path: impl Into<String>,
        total_bytes: Option<u64>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            direction,
            target_path: target_path.into(),
            total_bytes,
            transferred_bytes: 0,
            state: TransferState::Pending,
            cancel,
        }
    }

    /// Total size, if known.
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Bytes moved so far.
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    /// Current state.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Cancellation handle of this task.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Progress percentage, `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(0) => Some(if self.state == TransferState::Completed { 100.0 } else { 0.0 }),
            Some(total) => Some(self.transferred_bytes as f64 / total as f64 * 100.0),
            None => None,
        }
    }

    /// Record the total size once it is known (downloads).
    pub fn set_total(&mut self, total: Option<u64>) {
        if self.state.is_terminal() {
            return;
        }
        self.total_bytes = total;
        self.clamp();
    }

    /// Record progress. Returns `false` if the task is already terminal.
    pub fn advance(&mut self, transferred: u64) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = TransferState::InProgress;
        self.transferred_bytes = self.transferred_bytes.max(transferred);
        self.clamp();
        true
    }

    /// Mark the task completed.
    pub fn complete(&mut self) -> bool {
        if !self.transition(TransferState::Completed) {
            return false;
        }
        if let Some(total) = self.total_bytes {
            self.transferred_bytes = total;
        }
        true
    }

    /// Mark the task cancelled.
    pub fn mark_cancelled(&mut self) -> bool {
        self.transition(TransferState::Cancelled)
    }

    /// Mark the task failed.
    pub fn fail(&mut self) -> bool {
        self.transition(TransferState::Failed)
    }

    fn transition(&mut self, to: TransferState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = to;
        true
    }

    fn clamp(&mut self) {
        if let Some(total) = self.total_bytes {
            self.transferred_bytes = self.transferred_bytes.min(total);
        }
    }
}
