use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::board::validation::{parse_calendar_date, require_text, ValidationError};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job listing as held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub category: String,
    #[serde(deserialize_with = "deserialize_posted_date")]
    pub posted_date: NaiveDate,
    #[serde(default)]
    pub company_description: String,
}

impl JobPosting {
    /// Checks the fields the catalog refuses to store without.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", self.id.as_str())?;
        require_text("title", &self.title)?;
        require_text("company", &self.company)?;
        require_text("location", &self.location)?;
        require_text("category", &self.category)?;

        if self.requirements.iter().all(|entry| entry.trim().is_empty()) {
            return Err(ValidationError::NoRequirements);
        }

        Ok(())
    }

    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.company.to_lowercase().contains(needle)
    }

    pub(crate) fn matches_category(&self, category: &str) -> bool {
        category.is_empty() || self.category.trim().to_lowercase() == category
    }
}

/// Employer-editable fields of a posting, as submitted by the post/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub company_description: String,
}

impl JobDraft {
    /// Builds a posting, trimming text fields and dropping blank requirement rows.
    pub fn into_posting(self, id: JobId, posted_date: NaiveDate) -> JobPosting {
        JobPosting {
            id,
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            location: self.location.trim().to_string(),
            employment_type: self.employment_type.trim().to_string(),
            salary: self.salary.trim().to_string(),
            description: self.description.trim().to_string(),
            requirements: self
                .requirements
                .into_iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
            category: self.category.trim().to_string(),
            posted_date,
            company_description: self.company_description.trim().to_string(),
        }
    }

    /// Validates the draft as if it were stored under a placeholder id.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.clone()
            .into_posting(JobId::new("draft"), NaiveDate::MIN)
            .validate()
    }
}

impl From<&JobPosting> for JobDraft {
    fn from(posting: &JobPosting) -> Self {
        Self {
            title: posting.title.clone(),
            company: posting.company.clone(),
            location: posting.location.clone(),
            employment_type: posting.employment_type.clone(),
            salary: posting.salary.clone(),
            description: posting.description.clone(),
            requirements: posting.requirements.clone(),
            category: posting.category.clone(),
            company_description: posting.company_description.clone(),
        }
    }
}

fn deserialize_posted_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}
