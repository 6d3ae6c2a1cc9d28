use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Form field names as posted by the marketing page.
pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL: &str = "email";
pub const AGE_RANGE: &str = "ageRange";
pub const WHY_SENS: &str = "whySens";
pub const TIMESTAMP: &str = "timestamp";

const SUBMITTED_FIELDS: [&str; 5] = [FIRST_NAME, LAST_NAME, EMAIL, AGE_RANGE, WHY_SENS];

/// Age brackets offered by the signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "18-24")]
    EighteenToTwentyFour,
    #[serde(rename = "25-34")]
    TwentyFiveToThirtyFour,
    #[serde(rename = "35-44")]
    ThirtyFiveToFortyFour,
    #[serde(rename = "45+")]
    FortyFivePlus,
}

impl AgeRange {
    pub const ALL: [AgeRange; 4] = [
        AgeRange::EighteenToTwentyFour,
        AgeRange::TwentyFiveToThirtyFour,
        AgeRange::ThirtyFiveToFortyFour,
        AgeRange::FortyFivePlus,
    ];

    pub fn token(self) -> &'static str {
        match self {
            AgeRange::EighteenToTwentyFour => "18-24",
            AgeRange::TwentyFiveToThirtyFour => "25-34",
            AgeRange::ThirtyFiveToFortyFour => "35-44",
            AgeRange::FortyFivePlus => "45+",
        }
    }

    pub fn from_token(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.token() == raw)
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Untyped field mapping captured from the signup form.
///
/// Keys other than the five recognized field names are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSubmission(pub HashMap<String, String>);

impl RawSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Missing text fields read as empty rather than failing.
    pub fn text(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    pub fn extract(&self) -> CapturedFields {
        CapturedFields {
            first_name: self.text(FIRST_NAME),
            last_name: self.text(LAST_NAME),
            email: self.text(EMAIL),
            age_range: self.get(AGE_RANGE).map(str::to_string),
            why_sens: self.text(WHY_SENS),
        }
    }
}

impl RawSubmission {
    /// Reads a JSON object body. `null` counts as an absent field; any other
    /// non-text value for a recognized field is refused.
    pub fn from_json_object(object: Map<String, Value>) -> Result<Self, PayloadError> {
        let mut fields = HashMap::with_capacity(object.len());
        for (name, value) in object {
            match value {
                Value::String(text) => {
                    fields.insert(name, text);
                }
                Value::Null => {}
                _ if SUBMITTED_FIELDS.contains(&name.as_str()) => {
                    return Err(PayloadError::NonText(name));
                }
                _ => {}
            }
        }
        Ok(Self(fields))
    }
}

/// Request bodies that cannot be read as a submission at all.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("request body is not a submission: {0}")]
    Malformed(String),
    #[error("field `{0}` must be text")]
    NonText(String),
}

impl From<HashMap<String, String>> for RawSubmission {
    fn from(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }
}

/// Recognized fields as captured, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age_range: Option<String>,
    pub why_sens: String,
}

impl CapturedFields {
    /// Upper-case every free text field; the age bracket is already a fixed token.
    pub fn normalize(self, timestamp: DateTime<Utc>) -> WaitlistEntry {
        WaitlistEntry {
            first_name: self.first_name.to_uppercase(),
            last_name: self.last_name.to_uppercase(),
            email: normalize_email(&self.email),
            age_range: self.age_range,
            why_sens: self.why_sens.to_uppercase(),
            timestamp,
        }
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.to_uppercase()
}

/// Persisted waitlist record, one per normalized email in the keyed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age_range: Option<String>,
    pub why_sens: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
}

impl WaitlistEntry {
    /// Flat field/value pairs for hash-style stores; an absent age range is omitted.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (FIRST_NAME, self.first_name.clone()),
            (LAST_NAME, self.last_name.clone()),
            (EMAIL, self.email.clone()),
        ];
        if let Some(age_range) = &self.age_range {
            fields.push((AGE_RANGE, age_range.clone()));
        }
        fields.push((WHY_SENS, self.why_sens.clone()));
        fields.push((TIMESTAMP, format_timestamp(&self.timestamp)));
        fields
    }

    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, FieldDecodeError> {
        let text = |name: &'static str| {
            fields
                .get(name)
                .cloned()
                .ok_or(FieldDecodeError::Missing(name))
        };

        let raw_timestamp = text(TIMESTAMP)?;
        let timestamp = parse_timestamp(&raw_timestamp)
            .map_err(|_| FieldDecodeError::Timestamp(raw_timestamp.clone()))?;

        Ok(Self {
            first_name: text(FIRST_NAME)?,
            last_name: text(LAST_NAME)?,
            email: text(EMAIL)?,
            age_range: fields.get(AGE_RANGE).cloned(),
            why_sens: text(WHY_SENS)?,
            timestamp,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldDecodeError {
    #[error("stored entry is missing field `{0}`")]
    Missing(&'static str),
    #[error("stored timestamp `{0}` is not RFC 3339")]
    Timestamp(String),
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|parsed| parsed.with_timezone(&Utc))
}

mod timestamp_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(timestamp))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
