use std::collections::HashMap;
use std::io::Read;
use std::slice;

use super::domain::{JobId, JobPosting};
use super::import::{parse_postings, CatalogImportError};
use crate::board::validation::ValidationError;

/// Errors raised by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("job {0} not found")]
    NotFound(JobId),
}

/// Whether an upsert created a new posting or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Postings kept in insertion order with an id index.
#[derive(Debug, Default, Clone)]
pub struct JobCatalog {
    postings: Vec<JobPosting>,
    positions: HashMap<JobId, usize>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, posting: JobPosting) -> Result<UpsertOutcome, CatalogError> {
        posting.validate()?;

        match self.positions.get(&posting.id) {
            Some(&position) => {
                self.postings[position] = posting;
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                self.positions
                    .insert(posting.id.clone(), self.postings.len());
                self.postings.push(posting);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    pub fn remove(&mut self, id: &JobId) -> Result<JobPosting, CatalogError> {
        let position = self
            .positions
            .remove(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let removed = self.postings.remove(position);

        for shifted in &self.postings[position..] {
            if let Some(index) = self.positions.get_mut(&shifted.id) {
                *index -= 1;
            }
        }

        Ok(removed)
    }

    /// Lazily filters postings by search term (title or company) and category.
    ///
    /// Both filters are trimmed and compared case-insensitively; an empty filter matches
    /// everything. Results follow insertion order.
    pub fn query(&self, search_term: &str, category: &str) -> JobQuery<'_> {
        JobQuery {
            inner: self.postings.iter(),
            needle: search_term.trim().to_lowercase(),
            category: category.trim().to_lowercase(),
        }
    }

    pub fn by_id(&self, id: &JobId) -> Result<&JobPosting, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    pub fn get(&self, id: &JobId) -> Option<&JobPosting> {
        self.positions
            .get(id)
            .map(|&position| &self.postings[position])
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.positions.contains_key(id)
    }

    /// Distinct categories in the order they were first seen.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for posting in &self.postings {
            let category = posting.category.as_str();
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    pub fn iter(&self) -> slice::Iter<'_, JobPosting> {
        self.postings.iter()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Upserts every posting from a CSV export, returning how many new postings it added.
    ///
    /// Rows whose id is already in the catalog replace that posting and are not counted.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize, CatalogImportError> {
        let mut inserted = 0;
        for posting in parse_postings(reader)? {
            if self.upsert(posting)? == UpsertOutcome::Inserted {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

impl<'a> IntoIterator for &'a JobCatalog {
    type Item = &'a JobPosting;
    type IntoIter = slice::Iter<'a, JobPosting>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`JobCatalog::query`].
#[derive(Debug, Clone)]
pub struct JobQuery<'a> {
    inner: slice::Iter<'a, JobPosting>,
    needle: String,
    category: String,
}

impl<'a> Iterator for JobQuery<'a> {
    type Item = &'a JobPosting;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        let category = &self.category;
        self.inner
            .by_ref()
            .find(|posting| posting.matches_search(needle) && posting.matches_category(category))
    }
}
