use serde::{Deserialize, Serialize};

use super::domain::{AgeRange, CapturedFields, AGE_RANGE, EMAIL, FIRST_NAME, LAST_NAME};

/// Whether submissions pass through the validation stage before persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Accept whatever the form posted, including blank or unknown values.
    #[default]
    Permissive,
    Strict,
}

impl ValidationMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" | "off" => Some(Self::Permissive),
            "strict" | "on" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// A single reason a captured field was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

impl FieldViolation {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Checks run in strict mode. All violations are collected, not just the first.
pub fn validate(fields: &CapturedFields) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();

    if fields.first_name.trim().is_empty() {
        violations.push(FieldViolation::new(FIRST_NAME, "first name is required"));
    }
    if fields.last_name.trim().is_empty() {
        violations.push(FieldViolation::new(LAST_NAME, "last name is required"));
    }
    if let Err(reason) = check_email(&fields.email) {
        violations.push(FieldViolation::new(EMAIL, reason));
    }
    match fields.age_range.as_deref() {
        None => violations.push(FieldViolation::new(AGE_RANGE, "age range is required")),
        Some(raw) if AgeRange::from_token(raw).is_none() => violations.push(FieldViolation::new(
            AGE_RANGE,
            format!("`{raw}` is not one of 18-24, 25-34, 35-44, 45+"),
        )),
        Some(_) => {}
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_email(raw: &str) -> Result<(), &'static str> {
    if raw.trim().is_empty() {
        return Err("email is required");
    }
    if raw.chars().any(char::is_whitespace) {
        return Err("email must not contain whitespace");
    }

    let mut parts = raw.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("email must contain exactly one @");
    };

    if local.is_empty() {
        return Err("email is missing the part before @");
    }
    let dotted = domain
        .find('.')
        .is_some_and(|_| !domain.starts_with('.') && !domain.ends_with('.'));
    if !dotted {
        return Err("email domain must look like example.com");
    }

    Ok(())
}
