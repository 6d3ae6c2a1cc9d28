use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Acceptance clock with millisecond resolution.
///
/// Never issues an instant earlier than one it already issued, so wall-clock
/// steps backwards are clamped to the last stamp.
#[derive(Debug, Default)]
pub struct SubmissionClock {
    last_millis: AtomicI64,
}

impl SubmissionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.stamp(Utc::now())
    }

    pub(crate) fn stamp(&self, observed: DateTime<Utc>) -> DateTime<Utc> {
        let observed_millis = observed.timestamp_millis();
        let previous = self.last_millis.fetch_max(observed_millis, Ordering::AcqRel);
        let issued = previous.max(observed_millis);
        DateTime::from_timestamp_millis(issued).unwrap_or(observed)
    }
}
