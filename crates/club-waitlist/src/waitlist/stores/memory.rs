use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::waitlist::domain::WaitlistEntry;
use crate::waitlist::repository::{EntryKey, StoreError, WaitlistStore};

/// Process-local store for development runs and tests.
#[derive(Debug, Default)]
pub struct MemoryWaitlistStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<EntryKey, WaitlistEntry>,
    log: Vec<WaitlistEntry>,
}

impl MemoryWaitlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keyed entries.
    pub async fn entry_count(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}

#[async_trait]
impl WaitlistStore for MemoryWaitlistStore {
    async fn upsert(&self, key: &EntryKey, entry: &WaitlistEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.entries.insert(key.clone(), entry.clone());
        Ok(())
    }

    async fn append_to_log(&self, entry: &WaitlistEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.log.push(entry.clone());
        Ok(())
    }

    async fn fetch(&self, key: &EntryKey) -> Result<Option<WaitlistEntry>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.entries.get(key).cloned())
    }

    async fn log(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.log.clone())
    }
}
