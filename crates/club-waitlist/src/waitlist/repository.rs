use std::fmt;

use async_trait::async_trait;

use super::domain::{normalize_email, WaitlistEntry};

pub const DEFAULT_NAMESPACE: &str = "waitlist";

/// Storage key for a waitlist entry, `<namespace>:<NORMALIZED EMAIL>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(String);

impl EntryKey {
    /// Expects an email that has already been normalized.
    pub fn new(namespace: &str, normalized_email: &str) -> Self {
        Self(format!("{namespace}:{normalized_email}"))
    }

    pub fn for_raw_email(namespace: &str, raw_email: &str) -> Self {
        Self::new(namespace, &normalize_email(raw_email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn log_key(namespace: &str) -> String {
    format!("{namespace}:all")
}

/// Persistence capability behind the submission service.
///
/// `upsert` overwrites any entry already stored under the key. `append_to_log`
/// never overwrites. Each call is atomic on its own; the two are not linked.
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    async fn upsert(&self, key: &EntryKey, entry: &WaitlistEntry) -> Result<(), StoreError>;
    async fn append_to_log(&self, entry: &WaitlistEntry) -> Result<(), StoreError>;
    async fn fetch(&self, key: &EntryKey) -> Result<Option<WaitlistEntry>, StoreError>;
    /// Every logged record, oldest first.
    async fn log(&self) -> Result<Vec<WaitlistEntry>, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Unavailable(value.to_string())
    }
}
