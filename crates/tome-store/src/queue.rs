//! In-memory FIFO task queue.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use tome_core::{Result, Task, TaskQueue};

/// FIFO queue of consistency tasks, backed by a mutex-guarded deque.
///
/// `dequeue` never blocks: an empty queue returns `None` and the caller
/// (the worker loop) waits for its next tick.
#[derive(Clone, Default)]
pub struct MemTaskQueue {
    inner: Arc<Mutex<VecDeque<Task>>>,
}

impl MemTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for MemTaskQueue {
    async fn enqueue(&self, task: Task) -> Result<()> {
        debug!(task_kind = task.kind(), "Task enqueued");
        self.inner.lock().await.push_back(task);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Task>> {
        Ok(self.inner.lock().await.pop_front())
    }

    async fn pending_count(&self) -> Result<usize> {
        Ok(self.inner.lock().await.len())
    }
}
