use super::common::*;
use crate::waitlist::domain::RawSubmission;
use crate::waitlist::repository::{EntryKey, WaitlistStore};
use crate::waitlist::{SubmissionResult, ValidationMode, WaitlistSubmissionService};
use std::sync::Arc;

#[tokio::test]
async fn submit_normalizes_text_fields_and_keeps_age_range() {
    let (service, store) = build_service();

    let result = service
        .submit(
            RawSubmission::new()
                .with("firstName", "grace")
                .with("lastName", "Hopper")
                .with("email", "Grace@Navy.mil")
                .with("ageRange", "45+")
                .with("whySens", "Debugging moths"),
        )
        .await;

    let entry = expect_success(result);
    assert_eq!(entry.first_name, "GRACE");
    assert_eq!(entry.last_name, "HOPPER");
    assert_eq!(entry.email, "GRACE@NAVY.MIL");
    assert_eq!(entry.why_sens, "DEBUGGING MOTHS");
    assert_eq!(entry.age_range.as_deref(), Some("45+"));

    let stored = store
        .fetch(&EntryKey::new("waitlist", "GRACE@NAVY.MIL"))
        .await
        .expect("fetch succeeds")
        .expect("entry stored");
    assert_eq!(stored, entry);
}

#[tokio::test]
async fn scenario_single_submission_lands_in_both_views() {
    let (service, store) = build_service();

    let result = service.submit(ada()).await;
    assert!(result.is_success());

    assert_eq!(store.entry_count().await, 1);
    let stored = service
        .lookup("ada@x.com")
        .await
        .expect("lookup succeeds")
        .expect("entry present");
    assert_eq!(stored.email, "ADA@X.COM");
    assert_eq!(stored.why_sens, "CURIOSITY");
    assert_eq!(service.audit_log().await.expect("log reads").len(), 1);
}

#[tokio::test]
async fn resubmission_with_different_case_overwrites_keyed_entry() {
    let (service, store) = build_service();

    service.submit(ada()).await;
    let second = ada()
        .with("email", "ADA@X.COM")
        .with("lastName", "King");
    assert!(service.submit(second).await.is_success());

    assert_eq!(store.entry_count().await, 1);
    let stored = service
        .lookup("Ada@X.com")
        .await
        .expect("lookup succeeds")
        .expect("entry present");
    assert_eq!(stored.last_name, "KING");

    let log = service.audit_log().await.expect("log reads");
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].last_name, "LOVELACE");
    assert_eq!(log[1].last_name, "KING");
}

#[tokio::test]
async fn timestamps_never_decrease_in_log_order() {
    let (service, _) = build_service();

    for index in 0..25 {
        let email = format!("member{index}@club.test");
        service.submit(ada().with("email", email)).await;
    }

    let log = service.audit_log().await.expect("log reads");
    assert_eq!(log.len(), 25);
    assert!(log
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_write_does_not_reorder_log_timestamps() {
    let store = Arc::new(SlowFirstUpsert::default());
    let service = Arc::new(WaitlistSubmissionService::new(store.clone()));

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.submit(ada().with("email", "a@x.com")).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = {
        let service = service.clone();
        tokio::spawn(async move { service.submit(ada().with("email", "b@x.com")).await })
    };
    assert!(first.await.expect("task completes").is_success());
    assert!(second.await.expect("task completes").is_success());

    let log = store.inner.log().await.expect("log reads");
    let emails: Vec<_> = log.iter().map(|entry| entry.email.as_str()).collect();
    assert_eq!(emails, vec!["A@X.COM", "B@X.COM"]);
    assert!(log[0].timestamp <= log[1].timestamp);
}

#[tokio::test]
async fn upsert_fault_reports_failure_without_logging() {
    let store = Arc::new(FlakyStore::new(FailOn::Upsert));
    let service = WaitlistSubmissionService::new(store.clone());

    let result = service.submit(ada()).await;

    match result {
        SubmissionResult::Failure { reason } => {
            assert!(reason.contains("upsert"));
            assert!(reason.contains("waitlist:ADA@X.COM"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(store.inner.log().await.expect("log reads").is_empty());
}

#[tokio::test]
async fn append_fault_keeps_the_committed_upsert() {
    let store = Arc::new(FlakyStore::new(FailOn::AppendLog));
    let service = WaitlistSubmissionService::new(store.clone());

    let result = service.submit(ada()).await;

    assert!(matches!(
        result,
        SubmissionResult::Failure { ref reason } if reason.contains("append_log")
    ));
    assert_eq!(store.inner.entry_count().await, 1);
    assert!(store.inner.log().await.expect("log reads").is_empty());
}

#[tokio::test]
async fn missing_fields_default_to_empty_text() {
    let (service, _) = build_service();

    let result = service.submit(RawSubmission::new()).await;

    let entry = expect_success(result);
    assert_eq!(entry.first_name, "");
    assert_eq!(entry.last_name, "");
    assert_eq!(entry.email, "");
    assert_eq!(entry.why_sens, "");
    assert_eq!(entry.age_range, None);
}

#[tokio::test]
async fn permissive_mode_stores_unknown_age_range_verbatim() {
    let (service, _) = build_service();

    let result = service.submit(ada().with("ageRange", "over 9000")).await;

    let entry = expect_success(result);
    assert_eq!(entry.age_range.as_deref(), Some("over 9000"));
}

#[tokio::test]
async fn empty_emails_share_one_key() {
    let (service, store) = build_service();

    service
        .submit(RawSubmission::new().with("firstName", "first"))
        .await;
    service
        .submit(RawSubmission::new().with("firstName", "second"))
        .await;

    assert_eq!(store.entry_count().await, 1);
    let stored = service
        .lookup("")
        .await
        .expect("lookup succeeds")
        .expect("entry present");
    assert_eq!(stored.first_name, "SECOND");
}

#[tokio::test]
async fn strict_mode_rejects_before_any_write() {
    let (service, store) = build_service();
    let service = service.with_validation(ValidationMode::Strict);

    let result = service
        .submit(ada().with("email", "not-an-email").with("ageRange", "99"))
        .await;

    let violations = match result {
        SubmissionResult::Rejected(violations) => violations,
        other => panic!("expected rejection, got {other:?}"),
    };
    let fields: Vec<_> = violations.iter().map(|violation| violation.field).collect();
    assert_eq!(fields, vec!["email", "ageRange"]);
    assert_eq!(store.entry_count().await, 0);
    assert!(service.audit_log().await.expect("log reads").is_empty());

    assert!(service.submit(ada()).await.is_success());
}

#[tokio::test]
async fn namespace_prefixes_keys() {
    let store = Arc::new(crate::waitlist::MemoryWaitlistStore::new());
    let service = WaitlistSubmissionService::new(store.clone()).with_namespace("club");

    service.submit(ada()).await;

    assert_eq!(service.key_for("ada@x.com").as_str(), "club:ADA@X.COM");
    assert!(store
        .fetch(&EntryKey::new("club", "ADA@X.COM"))
        .await
        .expect("fetch succeeds")
        .is_some());
}

#[tokio::test]
async fn concurrent_submissions_for_one_email_leave_one_entry() {
    let (service, store) = build_service();
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for index in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .submit(ada().with("lastName", format!("racer{index}")))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.expect("task completes").is_success());
    }

    assert_eq!(store.entry_count().await, 1);
    assert_eq!(service.audit_log().await.expect("log reads").len(), 10);
}
