//! Background writer that applies persistence snapshots in order.
//!
//! One task owns the write side of the store. Snapshots are written one at a
//! time in the order they were queued, so an older snapshot can never land
//! after a newer one. When several snapshots are waiting only the newest is
//! written.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::{KvStore, StorageKey};
use crate::error::StoreError;
use crate::session::{FastingState, History};

/// Everything the tracker persists after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: FastingState,
    pub history: History,
}

enum Command {
    Persist(Box<Snapshot>),
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

/// Handle to the writer task. Dropping it closes the queue; the task writes
/// what is still queued and exits.
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistenceWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(store: Arc<dyn KvStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(store, rx));
        Self { tx }
    }

    /// Queue a snapshot. Never blocks and never fails the caller.
    pub fn persist(&self, snapshot: Snapshot) {
        if self.tx.send(Command::Persist(Box::new(snapshot))).is_err() {
            warn!("persistence writer has stopped; snapshot dropped");
        }
    }

    /// Wait until every snapshot queued so far has been handled.
    ///
    /// Returns the outcome of the most recent write attempt.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack))
            .map_err(|_| StoreError::WriterClosed)?;
        done.await.map_err(|_| StoreError::WriterClosed)?
    }
}

async fn run(store: Arc<dyn KvStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut last_result: Result<(), StoreError> = Ok(());

    while let Some(command) = rx.recv().await {
        let (mut latest, mut pending_flush) = match command {
            Command::Persist(snapshot) => (snapshot, None),
            Command::Flush(ack) => {
                let _ = ack.send(last_result.clone());
                continue;
            }
        };

        // Coalesce whatever else is already queued, stopping at a flush so
        // it is acknowledged right after the write it waits for.
        while let Ok(next) = rx.try_recv() {
            match next {
                Command::Persist(snapshot) => latest = snapshot,
                Command::Flush(ack) => {
                    pending_flush = Some(ack);
                    break;
                }
            }
        }

        last_result = write_snapshot(store.as_ref(), &latest).await;
        if let Err(e) = &last_result {
            warn!(error = %e, "failed to persist fasting state");
        }
        if let Some(ack) = pending_flush {
            let _ = ack.send(last_result.clone());
        }
    }

    debug!("persistence writer shutting down");
}

async fn write_snapshot(store: &dyn KvStore, snapshot: &Snapshot) -> Result<(), StoreError> {
    let encode = |key: StorageKey, result: serde_json::Result<String>| {
        result.map_err(|e| StoreError::WriteFailed {
            key: key.as_str().to_string(),
            message: e.to_string(),
        })
    };

    let state = encode(StorageKey::State, serde_json::to_string(&snapshot.state))?;
    let history = encode(StorageKey::History, serde_json::to_string(&snapshot.history))?;
    let plan = encode(
        StorageKey::SelectedPlan,
        serde_json::to_string(&snapshot.state.selected_plan),
    )?;

    // History goes first: if a non-atomic store fails midway, an ended fast
    // is at worst duplicated, never dropped.
    store
        .set_many(&[
            (StorageKey::History.as_str(), history.as_str()),
            (StorageKey::State.as_str(), state.as_str()),
            (StorageKey::SelectedPlan.as_str(), plan.as_str()),
        ])
        .await?;
    debug!(sessions = snapshot.history.len(), "persisted fasting state");
    Ok(())
}
