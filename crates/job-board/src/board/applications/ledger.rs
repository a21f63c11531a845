use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationId, ApplicationStatus, ApplicationSubmission};
use crate::board::catalog::JobId;
use crate::board::validation::ValidationError;

/// Errors raised by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("application {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

type LedgerKey = (DateTime<Utc>, ApplicationId);

/// Applications ordered by applied date, then identifier.
#[derive(Debug, Default, Clone)]
pub struct ApplicationLedger {
    entries: BTreeMap<LedgerKey, Application>,
    keys: HashMap<ApplicationId, DateTime<Utc>>,
    sequence: u64,
}

impl ApplicationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new application as `pending`, applied at `applied_at`.
    pub fn submit(
        &mut self,
        submission: ApplicationSubmission,
        applied_at: DateTime<Utc>,
    ) -> Result<&Application, LedgerError> {
        let application = self.prepare(submission, applied_at)?;
        let key = (applied_at, application.id.clone());
        self.keys.insert(application.id.clone(), applied_at);
        Ok(self.entries.entry(key).or_insert(application))
    }

    /// Builds the `pending` record `submit` would store, reserving its id without recording it.
    ///
    /// Used when the record must be accepted elsewhere before it is [`restore`](Self::restore)d.
    pub fn prepare(
        &mut self,
        submission: ApplicationSubmission,
        applied_at: DateTime<Utc>,
    ) -> Result<Application, LedgerError> {
        submission.validate()?;

        let id = self.next_id();
        Ok(Application::from_submission(id, submission, applied_at))
    }

    /// Loads an existing record (e.g. from the remote API), replacing any record with the same id.
    pub fn restore(&mut self, application: Application) -> Result<(), LedgerError> {
        application.validate()?;

        if let Some(previous) = self.keys.remove(&application.id) {
            self.entries.remove(&(previous, application.id.clone()));
        }

        self.keys
            .insert(application.id.clone(), application.applied_at);
        self.entries
            .insert((application.applied_at, application.id.clone()), application);
        Ok(())
    }

    /// Validates a status change without applying it.
    pub fn check_transition(
        &self,
        id: &ApplicationId,
        next: ApplicationStatus,
    ) -> Result<&Application, LedgerError> {
        let application = self.get(id)?;
        if application.status.can_transition_to(next) {
            Ok(application)
        } else {
            Err(LedgerError::InvalidTransition {
                id: id.clone(),
                from: application.status,
                to: next,
            })
        }
    }

    pub fn transition(
        &mut self,
        id: &ApplicationId,
        next: ApplicationStatus,
    ) -> Result<&Application, LedgerError> {
        self.check_transition(id, next)?;

        let key = self.key_for(id)?;
        let application = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        application.status = next;
        Ok(application)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<&Application, LedgerError> {
        let key = self.key_for(id)?;
        self.entries
            .get(&key)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    pub fn list_all(&self) -> impl Iterator<Item = &Application> + '_ {
        self.entries.values()
    }

    pub fn list_by_job<'a>(
        &'a self,
        job_id: &'a JobId,
    ) -> impl Iterator<Item = &'a Application> + 'a {
        self.entries
            .values()
            .filter(move |application| &application.job_id == job_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key_for(&self, id: &ApplicationId) -> Result<LedgerKey, LedgerError> {
        self.keys
            .get(id)
            .map(|applied_at| (*applied_at, id.clone()))
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    fn next_id(&mut self) -> ApplicationId {
        loop {
            self.sequence += 1;
            let candidate = ApplicationId(format!("app-{:06}", self.sequence));
            if !self.keys.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
