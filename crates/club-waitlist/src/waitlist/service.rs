use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::clock::SubmissionClock;
use super::domain::{RawSubmission, WaitlistEntry};
use super::repository::{EntryKey, StoreError, WaitlistStore, DEFAULT_NAMESPACE};
use super::validation::{validate, FieldViolation, ValidationMode};

/// Outcome reported to the presentation layer for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// Both the keyed upsert and the log append completed.
    Success(WaitlistEntry),
    /// A storage write failed. `reason` is for server-side logs only.
    Failure { reason: String },
    /// Strict validation refused the fields; nothing was written.
    Rejected(Vec<FieldViolation>),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success(_))
    }
}

/// Normalizes, stamps, and persists waitlist submissions.
pub struct WaitlistSubmissionService<S: ?Sized> {
    store: Arc<S>,
    namespace: String,
    validation: ValidationMode,
    clock: SubmissionClock,
    /// Held from stamping until the log append finishes, so log order
    /// matches timestamp order.
    append_order: Mutex<()>,
}

impl<S> WaitlistSubmissionService<S>
where
    S: WaitlistStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            namespace: DEFAULT_NAMESPACE.to_string(),
            validation: ValidationMode::default(),
            clock: SubmissionClock::new(),
            append_order: Mutex::new(()),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn key_for(&self, raw_email: &str) -> EntryKey {
        EntryKey::for_raw_email(&self.namespace, raw_email)
    }

    /// Accept one form submission. Storage faults are logged and reported as
    /// [`SubmissionResult::Failure`]; this never returns an error.
    pub async fn submit(&self, raw: RawSubmission) -> SubmissionResult {
        let captured = raw.extract();

        if self.validation == ValidationMode::Strict {
            if let Err(violations) = validate(&captured) {
                warn!(
                    violations = violations.len(),
                    "waitlist submission rejected by validation"
                );
                return SubmissionResult::Rejected(violations);
            }
        }

        let _ordered = self.append_order.lock().await;
        let entry = captured.normalize(self.clock.now());
        let key = EntryKey::new(&self.namespace, &entry.email);

        match self.persist(&key, &entry).await {
            Ok(()) => {
                info!(key = %key, "waitlist entry saved");
                SubmissionResult::Success(entry)
            }
            Err((operation, fault)) => {
                error!(key = %key, operation, error = %fault, "error saving to waitlist");
                SubmissionResult::Failure {
                    reason: format!("{operation} failed for {key}: {fault}"),
                }
            }
        }
    }

    async fn persist(
        &self,
        key: &EntryKey,
        entry: &WaitlistEntry,
    ) -> Result<(), (&'static str, StoreError)> {
        self.store
            .upsert(key, entry)
            .await
            .map_err(|fault| ("upsert", fault))?;
        self.store
            .append_to_log(entry)
            .await
            .map_err(|fault| ("append_log", fault))
    }

    /// Current keyed entry for an email, matched case-insensitively.
    pub async fn lookup(&self, raw_email: &str) -> Result<Option<WaitlistEntry>, StoreError> {
        self.store.fetch(&self.key_for(raw_email)).await
    }

    /// Every accepted submission, oldest first.
    pub async fn audit_log(&self) -> Result<Vec<WaitlistEntry>, StoreError> {
        self.store.log().await
    }
}
