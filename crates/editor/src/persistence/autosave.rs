//! Background auto-save
//!
//! The editor publishes its item list into a watch channel; a tokio task
//! writes the latest list to the auto-save slot on every interval tick
//! when it changed since the last write. Editing never waits on storage.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::Item;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::layouts::LayoutStore;
use super::storage::Storage;
use super::StorageError;

/// Layout store shared between the editor and the auto-save task
pub type SharedStore<S> = Arc<Mutex<LayoutStore<S>>>;

type FlushReply = oneshot::Sender<Result<(), StorageError>>;

pub struct AutoSaver {
    items: watch::Sender<Vec<Item>>,
    flush: mpsc::Sender<FlushReply>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Start the task. Must be called inside a tokio runtime.
    pub fn spawn<S>(store: SharedStore<S>, interval: Duration) -> Self
    where
        S: Storage + Send + 'static,
    {
        let (items, items_rx) = watch::channel(Vec::new());
        let (flush, flush_rx) = mpsc::channel(4);
        let task = tokio::spawn(run(store, interval, items_rx, flush_rx));
        tracing::info!("Auto-save every {} ms", interval.as_millis());
        Self { items, flush, task }
    }

    /// Start with the interval from the store's settings
    pub fn from_settings<S>(store: SharedStore<S>) -> Self
    where
        S: Storage + Send + 'static,
    {
        let interval_ms = match store.lock() {
            Ok(guard) => guard.settings().auto_save_interval_ms,
            Err(poisoned) => poisoned.into_inner().settings().auto_save_interval_ms,
        };
        Self::spawn(store, Duration::from_millis(interval_ms.max(1)))
    }

    /// Publish the current item list. Identical lists do not mark a change.
    pub fn update(&self, items: Vec<Item>) {
        self.items.send_if_modified(|current| {
            if *current == items {
                false
            } else {
                *current = items;
                true
            }
        });
    }

    /// Write the latest list immediately
    pub async fn save_now(&self) -> Result<(), StorageError> {
        let (reply, response) = oneshot::channel();
        self.flush
            .send(reply)
            .await
            .map_err(|_| StorageError::Unavailable("auto-save task has stopped".into()))?;
        response
            .await
            .map_err(|_| StorageError::Unavailable("auto-save task has stopped".into()))?
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task, writing pending changes first
    pub async fn shutdown(self) {
        let Self { items, flush, task } = self;
        drop(items);
        drop(flush);
        if let Err(e) = task.await {
            tracing::error!("Auto-save task failed: {e}");
        }
    }
}

async fn run<S>(
    store: SharedStore<S>,
    interval: Duration,
    mut items: watch::Receiver<Vec<Item>>,
    mut flush: mpsc::Receiver<FlushReply>,
) where
    S: Storage + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    let mut dirty = false;
    loop {
        tokio::select! {
            changed = items.changed() => {
                if changed.is_err() {
                    break;
                }
                dirty = true;
            }
            _ = ticker.tick() => {
                if dirty {
                    let snapshot = items.borrow_and_update().clone();
                    match write(&store, snapshot).await {
                        Ok(()) => dirty = false,
                        Err(e) => tracing::error!("Auto-save failed: {e}"),
                    }
                }
            }
            Some(reply) = flush.recv() => {
                let snapshot = items.borrow_and_update().clone();
                let result = write(&store, snapshot).await;
                if result.is_ok() {
                    dirty = false;
                }
                let _ = reply.send(result);
            }
        }
    }

    if dirty {
        let snapshot = items.borrow().clone();
        if let Err(e) = write(&store, snapshot).await {
            tracing::error!("Final auto-save failed: {e}");
        }
    }
    tracing::debug!("Auto-save task stopped");
}

async fn write<S>(store: &SharedStore<S>, items: Vec<Item>) -> Result<(), StorageError>
where
    S: Storage + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || {
        let mut guard = store
            .lock()
            .map_err(|_| StorageError::Unavailable("layout store lock poisoned".into()))?;
        guard.auto_save(&items)
    })
    .await
    .map_err(|e| StorageError::Unavailable(format!("auto-save worker failed: {e}")))?
}
