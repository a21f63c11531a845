//! Job posting catalog with text and category filtering.

pub mod domain;
pub mod import;
mod store;

pub use domain::{JobDraft, JobId, JobPosting};
pub use import::{parse_postings, CatalogImportError};
pub use store::{CatalogError, JobCatalog, JobQuery, UpsertOutcome};
