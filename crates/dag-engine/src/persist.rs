//! Debounced autosave
//!
//! The editing session never waits on storage. After each commit it hands an
//! owned snapshot to the [`Autosaver`], whose background task keeps only the
//! newest one and writes it once no newer snapshot has arrived for the
//! debounce window. Storage failures are logged and otherwise ignored.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{EditorError, Result};
use crate::snapshot::GraphSnapshot;

/// Where snapshots are kept
///
/// The storage medium (browser storage, file, backend) is up to the host.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot, replacing any previous one
    async fn save(&self, snapshot: &GraphSnapshot) -> Result<()>;

    /// Load the most recent snapshot, if any
    async fn load(&self) -> Result<Option<GraphSnapshot>>;
}

/// In-memory store, for tests and hosts that persist elsewhere
#[derive(Default)]
pub struct MemorySnapshotStore {
    latest: Mutex<Option<GraphSnapshot>>,
    saves: Mutex<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `save` was called
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn latest(&self) -> Option<GraphSnapshot> {
        self.latest.lock().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, snapshot: &GraphSnapshot) -> Result<()> {
        *self.latest.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }

    async fn load(&self) -> Result<Option<GraphSnapshot>> {
        Ok(self.latest.lock().clone())
    }
}

#[async_trait]
impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    async fn save(&self, snapshot: &GraphSnapshot) -> Result<()> {
        (**self).save(snapshot).await
    }

    async fn load(&self) -> Result<Option<GraphSnapshot>> {
        (**self).load().await
    }
}

/// Background writer with a trailing debounce
///
/// Must be created inside a tokio runtime.
pub struct Autosaver {
    tx: mpsc::UnboundedSender<GraphSnapshot>,
    handle: JoinHandle<()>,
}

impl Autosaver {
    /// Spawn the writer task
    pub fn spawn(store: Arc<dyn SnapshotStore>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(rx, store, debounce));
        log::debug!("Autosave started with {:?} debounce", debounce);
        Self { tx, handle }
    }

    /// Queue a snapshot without waiting
    ///
    /// Returns false if the writer task has stopped.
    pub fn notify(&self, snapshot: GraphSnapshot) -> bool {
        self.tx.send(snapshot).is_ok()
    }

    /// Flush any pending snapshot and stop the writer
    pub async fn shutdown(self) -> Result<()> {
        let Self { tx, handle } = self;
        drop(tx);
        handle
            .await
            .map_err(|e| EditorError::Persistence(format!("autosave task failed: {}", e)))
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<GraphSnapshot>, store: Arc<dyn SnapshotStore>, debounce: Duration) {
    while let Some(mut pending) = rx.recv().await {
        // Keep replacing the pending snapshot until the channel goes quiet
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(newer)) => pending = newer,
                Ok(None) | Err(_) => break,
            }
        }

        match store.save(&pending).await {
            Ok(()) => log::debug!(
                "Autosaved snapshot ({} nodes, {} edges)",
                pending.nodes.len(),
                pending.edges.len()
            ),
            Err(e) => log::warn!("Autosave failed: {}", e),
        }
    }
    log::debug!("Autosave stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DagBuilder;

    fn snapshot(tasks: usize) -> GraphSnapshot {
        let graph = (0..tasks)
            .fold(DagBuilder::new().root("root"), |b, i| b.task(format!("t{}", i), "BashOperator"))
            .build();
        GraphSnapshot::capture(&graph, false).unwrap()
    }

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn save(&self, _snapshot: &GraphSnapshot) -> Result<()> {
            Err(EditorError::Persistence("disk full".into()))
        }

        async fn load(&self) -> Result<Option<GraphSnapshot>> {
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_collapsed_into_one_save() {
        let store = Arc::new(MemorySnapshotStore::new());
        let saver = Autosaver::spawn(store.clone(), Duration::from_millis(500));

        for n in 1..=3 {
            assert!(saver.notify(snapshot(n)));
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.latest().unwrap().nodes.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_gaps_save_each_time() {
        let store = Arc::new(MemorySnapshotStore::new());
        let saver = Autosaver::spawn(store.clone(), Duration::from_millis(500));

        saver.notify(snapshot(1));
        tokio::time::sleep(Duration::from_millis(600)).await;
        saver.notify(snapshot(2));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(store.save_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_saved_inside_window() {
        let store = Arc::new(MemorySnapshotStore::new());
        let saver = Autosaver::spawn(store.clone(), Duration::from_millis(500));

        saver.notify(snapshot(1));
        tokio::time::sleep(Duration::from_millis(300)).await;
        saver.notify(snapshot(2));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending() {
        let store = Arc::new(MemorySnapshotStore::new());
        let saver = Autosaver::spawn(store.clone(), Duration::from_millis(500));

        saver.notify(snapshot(2));
        saver.shutdown().await.unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().await.unwrap().unwrap().nodes.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_keeps_task_alive() {
        let saver = Autosaver::spawn(Arc::new(FailingStore), Duration::from_millis(500));

        saver.notify(snapshot(1));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(saver.notify(snapshot(2)));
        saver.shutdown().await.unwrap();
    }
}
