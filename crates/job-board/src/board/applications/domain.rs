use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::board::catalog::JobId;
use crate::board::validation::{require_text, ValidationError};

/// Identifier wrapper for submitted applications.
///
/// Ids order by the text before their trailing digits, then by those digits as a number, so
/// `app-999999` sorts before `app-1000000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn ordering_key(&self) -> (&str, usize, &str, &str) {
        let prefix = self.0.trim_end_matches(|c: char| c.is_ascii_digit());
        let digits = self.0[prefix.len()..].trim_start_matches('0');
        (prefix, digits.len(), digits, &self.0)
    }
}

impl Ord for ApplicationId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordering_key().cmp(&other.ordering_key())
    }
}

impl PartialOrd for ApplicationId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Experience bracket the applicant selects on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicantCategory {
    Fresher,
    Intern,
    Experienced,
}

impl ApplicantCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantCategory::Fresher => "fresher",
            ApplicantCategory::Intern => "intern",
            ApplicantCategory::Experienced => "experienced",
        }
    }
}

impl FromStr for ApplicantCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fresher" => Ok(Self::Fresher),
            "intern" => Ok(Self::Intern),
            "experienced" => Ok(Self::Experienced),
            _ => Err(ValidationError::UnknownApplicantCategory {
                value: value.to_string(),
            }),
        }
    }
}

/// Lifecycle state of an application. `Selected` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Selected,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// Only `pending -> selected` and `pending -> rejected` are permitted.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (
                ApplicationStatus::Pending,
                ApplicationStatus::Selected | ApplicationStatus::Rejected
            )
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::UnknownStatus {
                value: value.to_string(),
            }),
        }
    }
}

/// Metadata returned by the attachment store for an uploaded CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub filename: String,
    pub path: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Applicant-supplied fields of an application, before the ledger assigns identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub job_id: JobId,
    pub applicant_name: String,
    pub applicant_category: ApplicantCategory,
    #[serde(default, deserialize_with = "deserialize_compensation")]
    pub current_package: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_compensation")]
    pub expected_package: Option<u64>,
    pub cover_letter: String,
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
}

impl ApplicationSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("job_id", self.job_id.as_str())?;
        require_text("applicant_name", &self.applicant_name)?;
        require_text("cover_letter", &self.cover_letter)?;
        Ok(())
    }
}

/// A recorded application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_name: String,
    pub applicant_category: ApplicantCategory,
    #[serde(default, deserialize_with = "deserialize_compensation")]
    pub current_package: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_compensation")]
    pub expected_package: Option<u64>,
    pub cover_letter: String,
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    pub(crate) fn from_submission(
        id: ApplicationId,
        submission: ApplicationSubmission,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_id: submission.job_id,
            applicant_name: submission.applicant_name.trim().to_string(),
            applicant_category: submission.applicant_category,
            current_package: submission.current_package,
            expected_package: submission.expected_package,
            cover_letter: submission.cover_letter.trim().to_string(),
            attachment: submission.attachment,
            status: ApplicationStatus::Pending,
            applied_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", self.id.as_str())?;
        require_text("job_id", self.job_id.as_str())?;
        require_text("applicant_name", &self.applicant_name)?;
        require_text("cover_letter", &self.cover_letter)?;
        Ok(())
    }
}

/// Parses an optional package figure from a form or API value.
///
/// The apply form submits number inputs as strings, so numeric strings are accepted and an
/// empty string means "not provided".
pub fn parse_compensation(
    field: &'static str,
    raw: &str,
) -> Result<Option<u64>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidCompensation {
            field,
            value: raw.to_string(),
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CompensationValue {
    Number(u64),
    Text(String),
}

fn deserialize_compensation<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CompensationValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(CompensationValue::Number(value)) => Ok(Some(value)),
        Some(CompensationValue::Text(raw)) => {
            parse_compensation("package", &raw).map_err(serde::de::Error::custom)
        }
    }
}
