use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::applications::{
    ApplicantCategory, Application, ApplicationId, ApplicationLedger, ApplicationStatus,
    ApplicationSubmission, AttachmentRef, LedgerError,
};
use super::catalog::{CatalogError, JobCatalog, JobDraft, JobId, JobPosting, UpsertOutcome};
use super::dashboard::{self, EmployerDashboard, SeekerDashboard};
use super::remote::{
    AttachmentError, AttachmentStore, AttachmentUpload, BearerToken, JobBoardRemote, RemoteError,
};
use super::validation::ValidationError;

/// Composition root owning the catalog and ledger, each behind its own lock.
///
/// Lock order is catalog before ledger wherever both are held.
pub struct JobBoard<R, S> {
    remote: Arc<R>,
    attachments: Arc<S>,
    catalog: Mutex<JobCatalog>,
    ledger: Mutex<ApplicationLedger>,
}

/// Fields an applicant fills in on the apply form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub applicant_name: String,
    pub applicant_category: ApplicantCategory,
    #[serde(default)]
    pub current_package: Option<u64>,
    #[serde(default)]
    pub expected_package: Option<u64>,
    pub cover_letter: String,
}

impl ApplicationForm {
    pub fn into_submission(
        self,
        job_id: JobId,
        attachment: Option<AttachmentRef>,
    ) -> ApplicationSubmission {
        ApplicationSubmission {
            job_id,
            applicant_name: self.applicant_name,
            applicant_category: self.applicant_category,
            current_package: self.current_package,
            expected_package: self.expected_package,
            cover_letter: self.cover_letter,
            attachment,
        }
    }
}

/// Outcome of reloading state from the remote API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub jobs_loaded: usize,
    pub jobs_skipped: usize,
    pub applications_loaded: usize,
    pub applications_skipped: usize,
}

impl<R, S> JobBoard<R, S>
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    pub fn new(remote: Arc<R>, attachments: Arc<S>) -> Self {
        Self::with_state(
            remote,
            attachments,
            JobCatalog::new(),
            ApplicationLedger::new(),
        )
    }

    pub fn with_state(
        remote: Arc<R>,
        attachments: Arc<S>,
        catalog: JobCatalog,
        ledger: ApplicationLedger,
    ) -> Self {
        Self {
            remote,
            attachments,
            catalog: Mutex::new(catalog),
            ledger: Mutex::new(ledger),
        }
    }

    /// Replaces local state with the remote API's jobs and applications.
    ///
    /// Records that fail validation are skipped and logged rather than failing the refresh.
    pub fn refresh(&self) -> Result<RefreshSummary, JobBoardError> {
        let jobs = self.remote.list_jobs()?;
        let applications = self.remote.list_applications()?;
        let mut summary = RefreshSummary::default();

        let mut catalog = JobCatalog::new();
        for posting in jobs {
            let id = posting.id.clone();
            match catalog.upsert(posting) {
                Ok(_) => summary.jobs_loaded += 1,
                Err(err) => {
                    warn!(job_id = %id, error = %err, "skipping invalid remote job");
                    summary.jobs_skipped += 1;
                }
            }
        }

        let mut ledger = ApplicationLedger::new();
        for application in applications {
            let id = application.id.clone();
            match ledger.restore(application) {
                Ok(()) => summary.applications_loaded += 1,
                Err(err) => {
                    warn!(
                        application_id = %id,
                        error = %err,
                        "skipping invalid remote application"
                    );
                    summary.applications_skipped += 1;
                }
            }
        }

        *self.catalog() = catalog;
        *self.ledger() = ledger;

        info!(
            jobs = summary.jobs_loaded,
            applications = summary.applications_loaded,
            skipped = summary.jobs_skipped + summary.applications_skipped,
            "job board refreshed"
        );
        Ok(summary)
    }

    pub fn post_job(
        &self,
        draft: JobDraft,
        today: NaiveDate,
    ) -> Result<JobPosting, JobBoardError> {
        draft.validate()?;

        let mut catalog = self.catalog();
        let posting = self.remote.create_job(&draft, today)?;
        if catalog.upsert(posting.clone())? == UpsertOutcome::Replaced {
            warn!(job_id = %posting.id, "remote reused an existing job id");
        }

        info!(job_id = %posting.id, category = %posting.category, "job posted");
        Ok(posting)
    }

    /// Replaces a posting's editable fields, keeping its id and posted date.
    pub fn edit_job(&self, id: &JobId, draft: JobDraft) -> Result<JobPosting, JobBoardError> {
        let mut catalog = self.catalog();
        let posted_date = catalog.by_id(id)?.posted_date;
        let posting = draft.into_posting(id.clone(), posted_date);
        posting.validate()?;

        self.remote.update_job(&posting)?;
        catalog.upsert(posting.clone())?;

        info!(job_id = %id, "job updated");
        Ok(posting)
    }

    /// Deletes a posting. Applications referring to it are kept.
    pub fn delete_job(&self, id: &JobId) -> Result<JobPosting, JobBoardError> {
        let mut catalog = self.catalog();
        catalog.by_id(id)?;

        self.remote.delete_job(id)?;
        let removed = catalog.remove(id)?;

        info!(job_id = %id, "job deleted");
        Ok(removed)
    }

    pub fn search(&self, search_term: &str, category: &str) -> Vec<JobPosting> {
        let catalog = self.catalog();
        let results: Vec<JobPosting> = catalog.query(search_term, category).cloned().collect();
        debug!(
            search_term,
            category,
            matches = results.len(),
            "job search evaluated"
        );
        results
    }

    pub fn job(&self, id: &JobId) -> Result<JobPosting, JobBoardError> {
        Ok(self.catalog().by_id(id)?.clone())
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog()
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Submits an application for a posting currently in the catalog.
    ///
    /// The form is validated before any attachment is uploaded, and the ledger only records the
    /// application the remote API stored.
    pub fn apply(
        &self,
        credential: &BearerToken,
        job_id: &JobId,
        form: ApplicationForm,
        upload: Option<AttachmentUpload>,
        now: DateTime<Utc>,
    ) -> Result<Application, JobBoardError> {
        self.catalog().by_id(job_id)?;

        let mut submission = form.into_submission(job_id.clone(), None);
        submission.validate()?;

        if let Some(upload) = upload {
            if upload.bytes.is_empty() {
                return Err(AttachmentError::Empty(upload.original_name).into());
            }
            submission.attachment = Some(self.attachments.store(upload)?);
        }

        let mut ledger = self.ledger();
        let prepared = ledger.prepare(submission, now)?;
        let application = self.remote.submit_application(credential, &prepared)?;
        if application.id != prepared.id {
            debug!(
                board_id = %prepared.id,
                remote_id = %application.id,
                "remote assigned its own application id"
            );
        }
        ledger.restore(application.clone())?;

        info!(
            application_id = %application.id,
            job_id = %application.job_id,
            has_attachment = application.attachment.is_some(),
            "application submitted"
        );
        Ok(application)
    }

    /// Moves a pending application to `selected` or `rejected`.
    pub fn review(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, JobBoardError> {
        let mut ledger = self.ledger();
        if let Err(err) = ledger.check_transition(id, status) {
            warn!(application_id = %id, error = %err, "status change refused");
            return Err(err.into());
        }

        self.remote.update_status(id, status)?;
        let application = ledger.transition(id, status)?.clone();

        info!(application_id = %id, status = %status, "application reviewed");
        Ok(application)
    }

    pub fn application(&self, id: &ApplicationId) -> Result<Application, JobBoardError> {
        Ok(self.ledger().get(id)?.clone())
    }

    pub fn applications(&self) -> Vec<Application> {
        self.ledger().list_all().cloned().collect()
    }

    pub fn applications_for(&self, job_id: &JobId) -> Vec<Application> {
        self.ledger().list_by_job(job_id).cloned().collect()
    }

    pub fn employer_dashboard(&self, reference: NaiveDate, months: usize) -> EmployerDashboard {
        let catalog = self.catalog();
        let ledger = self.ledger();
        dashboard::employer_dashboard(&catalog, &ledger, reference, months)
    }

    pub fn seeker_dashboard(&self, reference: NaiveDate, weeks: usize) -> SeekerDashboard {
        let catalog = self.catalog();
        let ledger = self.ledger();
        dashboard::seeker_dashboard(&catalog, &ledger, reference, weeks)
    }

    fn catalog(&self) -> MutexGuard<'_, JobCatalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ledger(&self) -> MutexGuard<'_, ApplicationLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the job board.
#[derive(Debug, thiserror::Error)]
pub enum JobBoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Coarse classification used to pick HTTP status codes and CLI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidTransition,
    Unauthorized,
    Upstream,
}

impl JobBoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobBoardError::Validation(_)
            | JobBoardError::Catalog(CatalogError::Validation(_))
            | JobBoardError::Ledger(LedgerError::Validation(_))
            | JobBoardError::Attachment(AttachmentError::Empty(_)) => ErrorKind::Validation,
            JobBoardError::Catalog(CatalogError::NotFound(_))
            | JobBoardError::Ledger(LedgerError::NotFound(_)) => ErrorKind::NotFound,
            JobBoardError::Ledger(LedgerError::InvalidTransition { .. }) => {
                ErrorKind::InvalidTransition
            }
            JobBoardError::Remote(RemoteError::Unauthorized) => ErrorKind::Unauthorized,
            JobBoardError::Remote(_) | JobBoardError::Attachment(AttachmentError::Transport(_)) => {
                ErrorKind::Upstream
            }
        }
    }
}
