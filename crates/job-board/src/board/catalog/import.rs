use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{JobId, JobPosting};
use super::store::{CatalogError, JobCatalog};
use crate::board::validation::{parse_calendar_date, ValidationError};

const REQUIREMENT_SEPARATOR: char = ';';

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid { row: usize, source: ValidationError },
    Catalog(CatalogError),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read posting export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid posting CSV data: {}", err),
            CatalogImportError::Invalid { row, source } => {
                write!(f, "posting row {} rejected: {}", row, source)
            }
            CatalogImportError::Catalog(err) => {
                write!(f, "could not apply posting export to catalog: {}", err)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::Invalid { source, .. } => Some(source),
            CatalogImportError::Catalog(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<CatalogError> for CatalogImportError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl JobCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogImportError> {
        let file = File::open(path)?;
        let mut catalog = Self::new();
        catalog.import_csv(file)?;
        Ok(catalog)
    }
}

/// Reads postings from a CSV export, validating each row.
pub fn parse_postings<R: Read>(reader: R) -> Result<Vec<JobPosting>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut postings = Vec::new();

    for (index, record) in csv_reader.deserialize::<PostingRow>().enumerate() {
        let row = index + 1;
        let posting = record?
            .into_posting()
            .map_err(|source| CatalogImportError::Invalid { row, source })?;
        posting
            .validate()
            .map_err(|source| CatalogImportError::Invalid { row, source })?;
        postings.push(posting);
    }

    Ok(postings)
}

#[derive(Debug, Deserialize)]
struct PostingRow {
    id: String,
    title: String,
    company: String,
    location: String,
    #[serde(rename = "type", default)]
    employment_type: String,
    #[serde(default)]
    salary: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    requirements: String,
    category: String,
    posted_date: String,
    #[serde(default)]
    company_description: String,
}

impl PostingRow {
    fn into_posting(self) -> Result<JobPosting, ValidationError> {
        let posted_date = parse_calendar_date(&self.posted_date)?;
        let requirements = self
            .requirements
            .split(REQUIREMENT_SEPARATOR)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        Ok(JobPosting {
            id: JobId(self.id),
            title: self.title,
            company: self.company,
            location: self.location,
            employment_type: self.employment_type,
            salary: self.salary,
            description: self.description,
            requirements,
            category: self.category,
            posted_date,
            company_description: self.company_description,
        })
    }
}
