//! Waitlist signup pipeline: capture, optional validation, normalization, and
//! persistence into a keyed view plus an append-only audit log.

pub mod clock;
pub mod domain;
pub mod export;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;
pub mod stores;
pub mod validation;

#[cfg(test)]
mod tests;

pub use clock::SubmissionClock;
pub use domain::{AgeRange, CapturedFields, PayloadError, RawSubmission, WaitlistEntry};
pub use lifecycle::{FormState, SubmissionInFlight};
pub use repository::{EntryKey, StoreError, WaitlistStore, DEFAULT_NAMESPACE};
pub use router::waitlist_router;
pub use service::{SubmissionResult, WaitlistSubmissionService};
pub use stores::{FileWaitlistStore, MemoryWaitlistStore, RedisWaitlistStore, WaitlistDocument};
pub use validation::{FieldViolation, ValidationMode};
