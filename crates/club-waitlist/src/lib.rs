//! Waitlist intake for the club marketing site.
//!
//! The presentation layer hands an untyped form submission to
//! [`waitlist::WaitlistSubmissionService::submit`] and renders the resulting
//! [`waitlist::FormState`]. Everything else in this crate supports that one
//! call: storage backends, configuration, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod waitlist;
