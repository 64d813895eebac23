//! In-process store. Clones share the same contents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::KvStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<String, String>>,
    write_count: Mutex<usize>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail until switched off.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current value of `key`, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        lock(&self.inner.entries).ok()?.get(key).cloned()
    }

    /// Number of keys successfully written so far.
    pub fn write_count(&self) -> usize {
        lock(&self.inner.write_count).map(|n| *n).unwrap_or(0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex.lock().map_err(|e| e.to_string())
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let fail = |message: String| StoreError::ReadFailed {
            key: key.to_string(),
            message,
        };
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(fail("injected read failure".into()));
        }
        let entries = lock(&self.inner.entries).map_err(fail)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let fail = |message: String| StoreError::WriteFailed {
            key: key.to_string(),
            message,
        };
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(fail("injected write failure".into()));
        }
        lock(&self.inner.entries)
            .map_err(fail)?
            .insert(key.to_string(), value.to_string());
        *lock(&self.inner.write_count).map_err(fail)? += 1;
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let Some((first, _)) = entries.first() else {
            return Ok(());
        };
        let fail = |message: String| StoreError::WriteFailed {
            key: first.to_string(),
            message,
        };
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(fail("injected write failure".into()));
        }
        let mut map = lock(&self.inner.entries).map_err(fail)?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        *lock(&self.inner.write_count).map_err(fail)? += entries.len();
        Ok(())
    }
}
