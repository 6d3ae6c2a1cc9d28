use super::service::SubmissionResult;

pub const SUCCESS_MESSAGE: &str = "You're on the list. We'll be in touch soon.";
pub const FAILURE_MESSAGE: &str = "Failed to join waitlist. Please try again.";
pub const REJECTED_MESSAGE: &str = "Please check the highlighted fields and try again.";

/// What the signup form shows while a submission is in progress or settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a waitlist submission is already in flight")]
pub struct SubmissionInFlight;

impl FormState {
    /// Enter `Pending`. Re-submission is refused until the current call settles.
    pub fn begin(&mut self) -> Result<(), SubmissionInFlight> {
        if *self == FormState::Pending {
            return Err(SubmissionInFlight);
        }
        *self = FormState::Pending;
        Ok(())
    }

    /// Settle a pending submission. Returns true when the caller should clear
    /// the form inputs.
    pub fn finish(&mut self, result: &SubmissionResult) -> bool {
        if *self != FormState::Pending {
            return false;
        }
        *self = match result {
            SubmissionResult::Success(_) => FormState::Succeeded,
            SubmissionResult::Failure { .. } | SubmissionResult::Rejected(_) => FormState::Failed,
        };
        *self == FormState::Succeeded
    }

    pub fn accepts_input(&self) -> bool {
        *self != FormState::Pending
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            FormState::Idle | FormState::Pending => None,
            FormState::Succeeded => Some(SUCCESS_MESSAGE),
            FormState::Failed => Some(FAILURE_MESSAGE),
        }
    }
}
