//! Persistence for the fasting state.
//!
//! The engine only needs an async key-value store holding JSON text under
//! three keys. [`PersistenceWriter`] serializes writes to it.

mod config;
mod memory;
mod sqlite;
mod writer;

pub use config::{Config, PlansConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use writer::{PersistenceWriter, Snapshot};

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::StoreError;

/// Async key-value store holding textual values.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several keys. Stores that can should apply them atomically; the
    /// default writes them one by one in the given order and stops at the
    /// first failure.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }
}

/// The logical keys the tracker persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    State,
    History,
    SelectedPlan,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [StorageKey::State, StorageKey::History, StorageKey::SelectedPlan];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::State => "fastingState",
            StorageKey::History => "fastingHistory",
            StorageKey::SelectedPlan => "selectedPlan",
        }
    }
}

/// Read and decode one key.
///
/// Read failures and undecodable payloads are logged and reported as absent,
/// so a damaged store degrades to defaults instead of failing startup.
pub async fn load_value<T: DeserializeOwned>(store: &dyn KvStore, key: StorageKey) -> Option<T> {
    let raw = match store.get(key.as_str()).await {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key = key.as_str(), error = %e, "failed to read from store");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key.as_str(), error = %e, "discarding unreadable stored value");
            None
        }
    }
}

/// Returns the data directory.
///
/// `FASTING_DATA_DIR` wins when set. Otherwise `~/.config/fasting-tracker/`,
/// or `~/.config/fasting-tracker-dev/` with `FASTING_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("FASTING_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FASTING_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("fasting-tracker-dev")
            } else {
                base_dir.join("fasting-tracker")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
