use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::waitlist::domain::WaitlistEntry;
use crate::waitlist::repository::{EntryKey, StoreError, WaitlistStore};

/// On-disk shape of the waitlist file.
///
/// `entries` is the keyed view (one per normalized email); `log` keeps every
/// accepted submission in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistDocument {
    #[serde(default)]
    pub entries: BTreeMap<String, WaitlistEntry>,
    #[serde(default)]
    pub log: Vec<WaitlistEntry>,
}

/// Local JSON file store. Every write reads the whole document, changes it,
/// and writes the whole document back through a temp file and rename.
///
/// Writers are serialized twice: by an async mutex inside this instance and by
/// an exclusive advisory lock on `<file>.lock`, which covers other store
/// instances and other processes pointed at the same file.
#[derive(Debug)]
pub struct FileWaitlistStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWaitlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as an empty document.
    pub async fn read_all(&self) -> Result<WaitlistDocument, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(WaitlistDocument::default());
            }
            Err(error) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {error}",
                    self.path.display()
                )));
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(WaitlistDocument::default());
        }

        serde_json::from_slice(&raw).map_err(|error| {
            StoreError::Serialization(format!(
                "failed to parse {}: {error}",
                self.path.display()
            ))
        })
    }

    pub async fn write_all(&self, document: &WaitlistDocument) -> Result<(), StoreError> {
        self.prepare_directory().await?;

        let payload = serde_json::to_vec_pretty(document)?;
        let temp_path = self.sibling(&format!(".{}.tmp", Uuid::new_v4().simple()));
        if let Err(error) = tokio::fs::write(&temp_path, payload).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Unavailable(format!(
                "failed to write {}: {error}",
                temp_path.display()
            )));
        }
        if let Err(error) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::Unavailable(format!(
                "failed to finalize {}: {error}",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Sidecar file holding the cross-process writer lock.
    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    async fn prepare_directory(&self) -> Result<(), StoreError> {
        let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty())
        else {
            return Ok(());
        };
        tokio::fs::create_dir_all(parent).await.map_err(|error| {
            StoreError::Unavailable(format!(
                "failed to prepare waitlist directory {}: {error}",
                parent.display()
            ))
        })
    }

    /// Blocks on a pool thread until the exclusive lock is granted. The lock
    /// is released when the returned handle is dropped.
    async fn lock_file(&self) -> Result<File, StoreError> {
        let lock_path = self.lock_path();
        tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(|error| StoreError::Unavailable(format!("lock task failed: {error}")))?
        .map_err(|error| {
            StoreError::Unavailable(format!(
                "failed to lock {}: {error}",
                self.lock_path().display()
            ))
        })
    }

    async fn mutate<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut WaitlistDocument) + Send,
    {
        let _guard = self.write_lock.lock().await;
        self.prepare_directory().await?;
        let _file_lock = self.lock_file().await?;

        let mut document = self.read_all().await?;
        change(&mut document);
        self.write_all(&document).await
    }
}

#[async_trait]
impl WaitlistStore for FileWaitlistStore {
    async fn upsert(&self, key: &EntryKey, entry: &WaitlistEntry) -> Result<(), StoreError> {
        self.mutate(|document| {
            document
                .entries
                .insert(key.as_str().to_string(), entry.clone());
        })
        .await
    }

    async fn append_to_log(&self, entry: &WaitlistEntry) -> Result<(), StoreError> {
        self.mutate(|document| document.log.push(entry.clone()))
            .await
    }

    async fn fetch(&self, key: &EntryKey) -> Result<Option<WaitlistEntry>, StoreError> {
        let mut document = self.read_all().await?;
        Ok(document.entries.remove(key.as_str()))
    }

    async fn log(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        Ok(self.read_all().await?.log)
    }
}
