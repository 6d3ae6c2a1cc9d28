use super::common::*;
use crate::waitlist::repository::{EntryKey, StoreError, WaitlistStore};
use crate::waitlist::stores::FileWaitlistStore;
use crate::waitlist::WaitlistSubmissionService;
use std::sync::Arc;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("dir lists")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "tmp"))
        .collect()
}

#[tokio::test]
async fn missing_file_reads_as_empty_document() {
    let dir = tempdir().expect("tempdir");
    let store = FileWaitlistStore::new(dir.path().join("waitlist.json"));

    let document = store.read_all().await.expect("empty read");

    assert!(document.entries.is_empty());
    assert!(document.log.is_empty());
}

#[tokio::test]
async fn upserts_by_key_and_appends_every_submission() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("waitlist.json");
    let store = Arc::new(FileWaitlistStore::new(&path));
    let service = WaitlistSubmissionService::new(store.clone());

    assert!(service.submit(ada()).await.is_success());
    assert!(service
        .submit(ada().with("email", "ADA@x.com").with("lastName", "Byron"))
        .await
        .is_success());

    let document = store.read_all().await.expect("document reads");
    assert_eq!(document.entries.len(), 1);
    assert_eq!(document.entries["waitlist:ADA@X.COM"].last_name, "BYRON");
    assert_eq!(document.log.len(), 2);
    assert!(leftover_temp_files(path.parent().expect("parent dir")).is_empty());
}

#[tokio::test]
async fn reopened_store_sees_previous_writes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("waitlist.json");

    {
        let service = WaitlistSubmissionService::new(Arc::new(FileWaitlistStore::new(&path)));
        assert!(service.submit(ada()).await.is_success());
    }

    let reopened = FileWaitlistStore::new(&path);
    let entry = reopened
        .fetch(&EntryKey::new("waitlist", "ADA@X.COM"))
        .await
        .expect("fetch succeeds")
        .expect("entry persisted");
    assert_eq!(entry.first_name, "ADA");
    assert_eq!(entry.age_range.as_deref(), Some("25-34"));
    assert_eq!(reopened.log().await.expect("log reads").len(), 1);
}

#[tokio::test]
async fn corrupt_file_surfaces_as_failure() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("waitlist.json");
    std::fs::write(&path, b"{ not json").expect("seed corrupt file");
    let store = Arc::new(FileWaitlistStore::new(&path));

    assert!(matches!(
        store.read_all().await,
        Err(StoreError::Serialization(_))
    ));

    let service = WaitlistSubmissionService::new(store);
    let result = service.submit(ada()).await;
    assert!(!result.is_success());
    assert_eq!(
        std::fs::read(&path).expect("file untouched"),
        b"{ not json".to_vec()
    );
}

#[tokio::test]
async fn concurrent_writes_do_not_lose_log_records() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(FileWaitlistStore::new(dir.path().join("waitlist.json")));
    let service = Arc::new(WaitlistSubmissionService::new(store.clone()));

    let mut handles = Vec::new();
    for index in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .submit(ada().with("email", format!("member{index}@club.test")))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.expect("task completes").is_success());
    }

    let document = store.read_all().await.expect("document reads");
    assert_eq!(document.entries.len(), 8);
    assert_eq!(document.log.len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_stores_on_one_file_keep_every_accepted_submission() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("waitlist.json");
    let services = [
        Arc::new(WaitlistSubmissionService::new(Arc::new(FileWaitlistStore::new(&path)))),
        Arc::new(WaitlistSubmissionService::new(Arc::new(FileWaitlistStore::new(&path)))),
    ];

    let mut handles = Vec::new();
    for index in 0..20 {
        let service = services[index % 2].clone();
        handles.push(tokio::spawn(async move {
            service
                .submit(ada().with("email", format!("member{}@club.test", index % 10)))
                .await
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        if handle.await.expect("task completes").is_success() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 20);
    let document = FileWaitlistStore::new(&path)
        .read_all()
        .await
        .expect("document reads");
    assert_eq!(document.log.len(), 20);
    assert_eq!(document.entries.len(), 10);
    assert!(leftover_temp_files(dir.path()).is_empty());
}
