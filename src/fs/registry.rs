//! Registry of in-flight transfers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::fs::task::{Direction, TaskId, TransferTask};

/// Tracks active transfers so they can be listed and cancelled by id.
///
/// Tasks are removed once they reach a terminal state.
#[derive(Debug, Default)]
pub struct TransferRegistry {
    tasks: Mutex<HashMap<TaskId, TransferTask>>,
    next_id: AtomicU64,
}

impl TransferRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin tracking a new task and return its snapshot.
    pub fn register(
        &self,
        direction: Direction,
        target_path: &str,
        total_bytes: Option<u64>,
        cancel: CancellationToken,
    ) -> TransferTask {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let task = TransferTask::new(id, direction, target_path, total_bytes, cancel);
        self.lock().insert(id, task.clone());
        task
    }

    /// Apply `f` to a tracked task.
    pub fn update<R>(&self, id: TaskId, f: impl FnOnce(&mut TransferTask) -> R) -> Option<R> {
        self.lock().get_mut(&id).map(f)
    }

    /// Stop tracking a task and return its final snapshot.
    pub fn remove(&self, id: TaskId) -> Option<TransferTask> {
        self.lock().remove(&id)
    }

    /// Snapshot of one task.
    pub fn get(&self, id: TaskId) -> Option<TransferTask> {
        self.lock().get(&id).cloned()
    }

    /// Snapshots of all tracked tasks, oldest first.
    pub fn active(&self) -> Vec<TransferTask> {
        let mut tasks: Vec<TransferTask> = self.lock().values().cloned().collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    /// Request cancellation of one task. Returns `false` if it is unknown.
    pub fn cancel(&self, id: TaskId) -> bool {
        match self.lock().get(&id) {
            Some(task) => {
                task.cancel_token().cancel();
                true
            }
            None => false,
        }
    }

    /// Request cancellation of every tracked task.
    pub fn cancel_all(&self) {
        for task in self.lock().values() {
            task.cancel_token().cancel();
        }
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, TransferTask>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::task::TransferState;

    #[test]
    fn test_register_assigns_increasing_ids() {
        let registry = TransferRegistry::new();
        let a = registry.register(Direction::Upload, "a", Some(1), CancellationToken::new());
        let b = registry.register(Direction::Download, "b", None, CancellationToken::new());
        assert!(b.id > a.id);
        assert_eq!(registry.len(), 2);

        let active: Vec<TaskId> = registry.active().iter().map(|t| t.id).collect();
        assert_eq!(active, vec![a.id, b.id]);
    }

    #[test]
    fn test_update_and_remove() {
        let registry = TransferRegistry::new();
        let task = registry.register(Direction::Upload, "a", Some(10), CancellationToken::new());

        registry.update(task.id, |t| t.advance(5));
        assert_eq!(registry.get(task.id).unwrap().transferred_bytes(), 5);

        registry.update(task.id, |t| t.complete());
        let done = registry.remove(task.id).unwrap();
        assert_eq!(done.state(), TransferState::Completed);
        assert!(registry.is_empty());
        assert!(registry.update(task.id, |t| t.fail()).is_none());
    }

    #[test]
    fn test_cancel() {
        let registry = TransferRegistry::new();
        let token = CancellationToken::new();
        let task = registry.register(Direction::Download, "a", None, token.clone());

        assert!(registry.cancel(task.id));
        assert!(token.is_cancelled());
        assert!(!registry.cancel(TaskId(999)));
    }

    #[test]
    fn test_cancel_all() {
        let registry = TransferRegistry::new();
        let t1 = CancellationToken::new();
        let t2 = CancellationToken::new();
        registry.register(Direction::Upload, "a", None, t1.clone());
        registry.register(Direction::Upload, "b", None, t2.clone());
        registry.cancel_all();
        assert!(t1.is_cancelled() && t2.is_cancelled());
    }
}
