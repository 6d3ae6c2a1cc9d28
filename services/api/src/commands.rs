use crate::infra::{service_from_config, SharedService};
use clap::{Args, ValueEnum};
use club_waitlist::config::AppConfig;
use club_waitlist::error::AppError;
use club_waitlist::telemetry;
use club_waitlist::waitlist::domain::{AGE_RANGE, EMAIL, FIRST_NAME, LAST_NAME, WHY_SENS};
use club_waitlist::waitlist::export::{write_csv, write_json_lines};
use club_waitlist::waitlist::lifecycle::REJECTED_MESSAGE;
use club_waitlist::waitlist::{FormState, RawSubmission, SubmissionResult};
use std::io::Write;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    #[arg(long)]
    pub(crate) first_name: String,
    #[arg(long)]
    pub(crate) last_name: String,
    #[arg(long)]
    pub(crate) email: String,
    /// One of 18-24, 25-34, 35-44, 45+
    #[arg(long)]
    pub(crate) age_range: Option<String>,
    /// Free-form answer to "why sens?"
    #[arg(long)]
    pub(crate) why_sens: Option<String>,
}

impl SubmitArgs {
    fn into_raw(self) -> RawSubmission {
        let mut raw = RawSubmission::new()
            .with(FIRST_NAME, self.first_name)
            .with(LAST_NAME, self.last_name)
            .with(EMAIL, self.email);
        if let Some(age_range) = self.age_range {
            raw = raw.with(AGE_RANGE, age_range);
        }
        if let Some(why_sens) = self.why_sens {
            raw = raw.with(WHY_SENS, why_sens);
        }
        raw
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Output format for the audit log
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    pub(crate) format: ExportFormat,
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let service = service_from_config(&config.waitlist).await?;

    let mut stdout = std::io::stdout().lock();
    submit_once(&service, args.into_raw(), &mut stdout).await
}

/// Drive one submission through the form lifecycle and report what a user would see.
pub(crate) async fn submit_once<W: Write>(
    service: &SharedService,
    raw: RawSubmission,
    out: &mut W,
) -> Result<(), AppError> {
    let mut state = FormState::default();
    state.begin()?;

    let result = service.submit(raw).await;
    state.finish(&result);

    match &result {
        SubmissionResult::Success(entry) => {
            writeln!(out, "{}", state.message().unwrap_or_default())?;
            writeln!(out, "key: {}", service.key_for(&entry.email))?;
        }
        SubmissionResult::Failure { .. } => {
            writeln!(out, "{}", state.message().unwrap_or_default())?;
        }
        SubmissionResult::Rejected(violations) => {
            writeln!(out, "{REJECTED_MESSAGE}")?;
            for violation in violations {
                writeln!(out, "- {}: {}", violation.field, violation.reason)?;
            }
        }
    }

    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = service_from_config(&config.waitlist).await?;

    let stdout = std::io::stdout().lock();
    export_log(&service, args.format, stdout).await
}

pub(crate) async fn export_log<W: Write>(
    service: &SharedService,
    format: ExportFormat,
    out: W,
) -> Result<(), AppError> {
    let entries = service.audit_log().await?;
    match format {
        ExportFormat::Json => write_json_lines(&entries, out)?,
        ExportFormat::Csv => write_csv(&entries, out)?,
    }
    Ok(())
}
