use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::waitlist::domain::{RawSubmission, WaitlistEntry};
use crate::waitlist::repository::{EntryKey, StoreError, WaitlistStore};
use crate::waitlist::stores::MemoryWaitlistStore;
use crate::waitlist::{SubmissionResult, WaitlistSubmissionService};

pub(super) fn ada() -> RawSubmission {
    RawSubmission::new()
        .with("firstName", "Ada")
        .with("lastName", "Lovelace")
        .with("email", "ada@x.com")
        .with("ageRange", "25-34")
        .with("whySens", "curiosity")
}

pub(super) fn build_service() -> (
    WaitlistSubmissionService<MemoryWaitlistStore>,
    Arc<MemoryWaitlistStore>,
) {
    let store = Arc::new(MemoryWaitlistStore::new());
    let service = WaitlistSubmissionService::new(store.clone());
    (service, store)
}

/// Which write a [`FlakyStore`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailOn {
    Upsert,
    AppendLog,
}

/// Memory store that raises a storage fault on one chosen write.
pub(super) struct FlakyStore {
    pub(super) inner: MemoryWaitlistStore,
    fail_on: FailOn,
}

impl FlakyStore {
    pub(super) fn new(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryWaitlistStore::new(),
            fail_on,
        }
    }
}

#[async_trait]
impl WaitlistStore for FlakyStore {
    async fn upsert(&self, key: &EntryKey, entry: &WaitlistEntry) -> Result<(), StoreError> {
        if self.fail_on == FailOn::Upsert {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.upsert(key, entry).await
    }

    async fn append_to_log(&self, entry: &WaitlistEntry) -> Result<(), StoreError> {
        if self.fail_on == FailOn::AppendLog {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.inner.append_to_log(entry).await
    }

    async fn fetch(&self, key: &EntryKey) -> Result<Option<WaitlistEntry>, StoreError> {
        self.inner.fetch(key).await
    }

    async fn log(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        self.inner.log().await
    }
}

/// Memory store whose first upsert stalls, letting later submissions catch up.
#[derive(Default)]
pub(super) struct SlowFirstUpsert {
    pub(super) inner: MemoryWaitlistStore,
    stalled: AtomicBool,
}

#[async_trait]
impl WaitlistStore for SlowFirstUpsert {
    async fn upsert(&self, key: &EntryKey, entry: &WaitlistEntry) -> Result<(), StoreError> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.inner.upsert(key, entry).await
    }

    async fn append_to_log(&self, entry: &WaitlistEntry) -> Result<(), StoreError> {
        self.inner.append_to_log(entry).await
    }

    async fn fetch(&self, key: &EntryKey) -> Result<Option<WaitlistEntry>, StoreError> {
        self.inner.fetch(key).await
    }

    async fn log(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        self.inner.log().await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn expect_success(result: SubmissionResult) -> WaitlistEntry {
    match result {
        SubmissionResult::Success(entry) => entry,
        other => panic!("expected success, got {other:?}"),
    }
}
