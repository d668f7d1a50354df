//! Periodic worker draining the consistency queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::time::sleep;
use tracing::{error, info, warn};

use tome_core::defaults::{TASK_TIMEOUT_SECS, WORKER_EVENT_CAPACITY, WORKER_TICK_MS};
use tome_core::{Result, Task, TaskQueue};

use crate::dispatch::Dispatcher;

/// Failure handling for a task that returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Log and drop the task. The default: every task is cheap to lose
    /// because the next write of the same kind re-enqueues equivalent work.
    None,
    /// Retry in place up to `max_attempts` total attempts, then drop.
    Fixed { max_attempts: u32 },
    /// Move the failed task to an in-memory dead-letter list for inspection.
    DeadLetter,
}

/// Configuration for the consistency worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Tick interval in milliseconds. One task is processed per tick.
    pub tick_interval_ms: u64,
    /// Whether to process tasks at all.
    pub enabled: bool,
    /// What to do when a task fails.
    pub retry: RetryPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: WORKER_TICK_MS,
            enabled: true,
            retry: RetryPolicy::None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `WORKER_ENABLED` | `true` | Enable/disable task processing |
    /// | `WORKER_TICK_MS` | `5000` | Tick interval |
    /// | `WORKER_RETRY` | `none` | `none`, `fixed:<attempts>`, or `dead-letter` |
    pub fn from_env() -> Self {
        let enabled = std::env::var("WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let tick_interval_ms = std::env::var("WORKER_TICK_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(WORKER_TICK_MS);

        let retry = std::env::var("WORKER_RETRY")
            .ok()
            .map(|v| parse_retry(&v))
            .unwrap_or(RetryPolicy::None);

        Self {
            tick_interval_ms,
            enabled,
            retry,
        }
    }

    pub fn with_tick_interval(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn parse_retry(value: &str) -> RetryPolicy {
    match value {
        "dead-letter" => RetryPolicy::DeadLetter,
        v if v.starts_with("fixed:") => v[6..]
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|max_attempts| RetryPolicy::Fixed { max_attempts })
            .unwrap_or(RetryPolicy::None),
        _ => RetryPolicy::None,
    }
}

/// Event emitted by the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    WorkerStarted,
    WorkerStopped,
    TaskStarted { kind: &'static str },
    TaskCompleted { kind: &'static str },
    TaskFailed { kind: &'static str, error: String },
}

/// Handle for controlling a running worker.
pub struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<WorkerEvent>,
}

impl WorkerHandle {
    /// Signal the worker to shut down gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| tome_core::Error::Internal("Failed to send shutdown signal".into()))
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_rx.resubscribe()
    }
}

/// Consistency worker: one tick, at most one task.
pub struct Worker {
    queue: Arc<dyn TaskQueue>,
    dispatcher: Dispatcher,
    config: WorkerConfig,
    event_tx: broadcast::Sender<WorkerEvent>,
    dead_letters: Arc<Mutex<Vec<(Task, String)>>>,
}

impl Worker {
    pub fn new(queue: Arc<dyn TaskQueue>, dispatcher: Dispatcher, config: WorkerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(WORKER_EVENT_CAPACITY);
        Self {
            queue,
            dispatcher,
            config,
            event_tx,
            dead_letters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_tx.subscribe()
    }

    /// Tasks parked by the dead-letter policy, with their error messages.
    pub async fn dead_letters(&self) -> Vec<(Task, String)> {
        self.dead_letters.lock().await.clone()
    }

    /// Start the worker and return a handle for control.
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        WorkerHandle {
            shutdown_tx,
            event_rx,
        }
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("Consistency worker is disabled, not starting");
            return;
        }

        info!(
            tick_interval_ms = self.config.tick_interval_ms,
            retry = ?self.config.retry,
            "Consistency worker started"
        );
        let _ = self.event_tx.send(WorkerEvent::WorkerStarted);

        let tick = Duration::from_millis(self.config.tick_interval_ms);
        loop {
            // One task per tick, whether or not more are waiting. The queue
            // drains slowly by design; spikes are absorbed as latency.
            match self.queue.dequeue().await {
                Ok(Some(task)) => self.process(task).await,
                Ok(None) => {}
                Err(err) => error!(error = %err, "Failed to dequeue task"),
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Consistency worker received shutdown signal");
                    break;
                }
                _ = sleep(tick) => {}
            }
        }

        let _ = self.event_tx.send(WorkerEvent::WorkerStopped);
        info!("Consistency worker stopped");
    }

    async fn process(&self, task: Task) {
        let kind = task.kind();
        let _ = self.event_tx.send(WorkerEvent::TaskStarted { kind });

        let max_attempts = match self.config.retry {
            RetryPolicy::Fixed { max_attempts } => max_attempts.max(1),
            _ => 1,
        };

        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            match self.run_with_timeout(&task).await {
                Ok(()) => {
                    let _ = self.event_tx.send(WorkerEvent::TaskCompleted { kind });
                    return;
                }
                Err(error) => {
                    warn!(task_kind = kind, attempt, %error, "Task attempt failed");
                    last_error = error;
                }
            }
        }

        match self.config.retry {
            RetryPolicy::DeadLetter => {
                self.dead_letters
                    .lock()
                    .await
                    .push((task, last_error.clone()));
            }
            _ => {
                warn!(task_kind = kind, error = %last_error, "Task failed, dropping");
            }
        }
        let _ = self.event_tx.send(WorkerEvent::TaskFailed {
            kind,
            error: last_error,
        });
    }

    async fn run_with_timeout(&self, task: &Task) -> std::result::Result<(), String> {
        let timeout = Duration::from_secs(TASK_TIMEOUT_SECS);
        match tokio::time::timeout(timeout, self.dispatcher.run_task(task)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err(format!("task exceeded timeout of {TASK_TIMEOUT_SECS}s")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use tome_store::{FsBlobStore, Store};

    fn dispatcher(store: &Store, dir: &tempfile::TempDir) -> Dispatcher {
        Dispatcher::new(
            Arc::new(store.documents.clone()),
            Arc::new(store.spaces.clone()),
            Arc::new(FsBlobStore::new(dir.path())),
        )
    }

    #[test]
    fn config_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.tick_interval_ms, WORKER_TICK_MS);
        assert!(config.enabled);
        assert_eq!(config.retry, RetryPolicy::None);
    }

    #[test]
    fn config_builder_chaining() {
        let config = WorkerConfig::default()
            .with_tick_interval(100)
            .with_enabled(false)
            .with_retry(RetryPolicy::Fixed { max_attempts: 3 });

        assert_eq!(config.tick_interval_ms, 100);
        assert!(!config.enabled);
        assert_eq!(config.retry, RetryPolicy::Fixed { max_attempts: 3 });
    }

    #[test]
    fn retry_policy_parsing() {
        assert_eq!(parse_retry("none"), RetryPolicy::None);
        assert_eq!(parse_retry("dead-letter"), RetryPolicy::DeadLetter);
        assert_eq!(
            parse_retry("fixed:5"),
            RetryPolicy::Fixed { max_attempts: 5 }
        );
        assert_eq!(parse_retry("fixed:0"), RetryPolicy::None);
        assert_eq!(parse_retry("fixed:junk"), RetryPolicy::None);
        assert_eq!(parse_retry("garbage"), RetryPolicy::None);
    }

    #[tokio::test(start_paused = true)]
    async fn one_task_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new();
        let space_id = Uuid::new_v4();
        // Two failing tasks (space missing): each takes one tick.
        for _ in 0..2 {
            store
                .queue
                .enqueue(Task::UpdateSpaceDocumentCount { space_id })
                .await
                .unwrap();
        }

        let worker = Worker::new(
            Arc::new(store.queue.clone()),
            dispatcher(&store, &dir),
            WorkerConfig::default().with_tick_interval(1_000),
        );
        let mut events = worker.events();
        let handle = worker.start();

        // The first pass takes exactly one task, then parks until the tick.
        tokio::task::yield_now().await;
        assert_eq!(store.queue.pending_count().await.unwrap(), 1);

        tokio::time::advance(Duration::from_millis(1_000)).await;
        tokio::task::yield_now().await;
        assert_eq!(store.queue.pending_count().await.unwrap(), 0);

        handle.shutdown().await.unwrap();

        let mut started = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, WorkerEvent::TaskStarted { .. }) {
                started += 1;
            }
        }
        assert_eq!(started, 2);
    }

    #[tokio::test]
    async fn disabled_worker_does_not_drain() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new();
        store
            .queue
            .enqueue(Task::UpdateSpaceDocumentCount {
                space_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        let worker = Worker::new(
            Arc::new(store.queue.clone()),
            dispatcher(&store, &dir),
            WorkerConfig::default().with_enabled(false),
        );
        let _handle = worker.start();
        tokio::task::yield_now().await;

        assert_eq!(store.queue.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_task_is_dropped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new();
        let dispatcher = dispatcher(&store, &dir);
        let worker = Worker::new(
            Arc::new(store.queue.clone()),
            dispatcher,
            WorkerConfig::default(),
        );
        let mut events = worker.events();

        // Missing document makes merge fail.
        worker
            .process(Task::UpdateDocumentMetadata {
                document_id: Uuid::new_v4(),
                views: 1,
                last_viewed: Utc::now(),
            })
            .await;

        assert_eq!(store.queue.pending_count().await.unwrap(), 0);
        assert!(worker.dead_letters().await.is_empty());

        let mut failed = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, WorkerEvent::TaskFailed { .. }) {
                failed = true;
            }
        }
        assert!(failed);
    }

    #[tokio::test]
    async fn dead_letter_policy_parks_failed_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new();
        let worker = Worker::new(
            Arc::new(store.queue.clone()),
            dispatcher(&store, &dir),
            WorkerConfig::default().with_retry(RetryPolicy::DeadLetter),
        );

        worker
            .process(Task::UpdateSpaceDocumentCount {
                space_id: Uuid::new_v4(),
            })
            .await;

        let parked = worker.dead_letters().await;
        assert_eq!(parked.len(), 1);
        assert!(matches!(parked[0].0, Task::UpdateSpaceDocumentCount { .. }));
        assert!(!parked[0].1.is_empty());
    }

    #[tokio::test]
    async fn fixed_retry_eventually_succeeds_or_drops() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new();
        let worker = Worker::new(
            Arc::new(store.queue.clone()),
            dispatcher(&store, &dir),
            WorkerConfig::default().with_retry(RetryPolicy::Fixed { max_attempts: 3 }),
        );
        let mut events = worker.events();

        worker
            .process(Task::UpdateSpaceDocumentCount {
                space_id: Uuid::new_v4(),
            })
            .await;

        // Three attempts, one terminal failure event.
        let mut failures = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, WorkerEvent::TaskFailed { .. }) {
                failures += 1;
            }
        }
        assert_eq!(failures, 1);
    }
}
