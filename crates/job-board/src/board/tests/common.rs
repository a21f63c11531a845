use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::board::{
    board_router, ApplicantCategory, Application, ApplicationForm, ApplicationId,
    ApplicationLedger, ApplicationStatus, ApplicationSubmission, AttachmentError, AttachmentRef,
    AttachmentStore, AttachmentUpload, BearerToken, DashboardWindow, JobBoard, JobBoardRemote,
    JobCatalog, JobDraft, JobId, JobPosting, RemoteError,
};

pub(super) const BOUNDARY: &str = "job-board-test-boundary";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn posting(id: &str, title: &str, company: &str, category: &str) -> JobPosting {
    JobPosting {
        id: JobId::new(id),
        title: title.to_string(),
        company: company.to_string(),
        location: "Remote".to_string(),
        employment_type: "Full-time".to_string(),
        salary: "$80k - $100k".to_string(),
        description: format!("{title} at {company}"),
        requirements: vec!["3+ years of experience".to_string()],
        category: category.to_string(),
        posted_date: date(2024, 3, 9),
        company_description: String::new(),
    }
}

/// Job "A" in the Design category.
pub(super) fn design_job() -> JobPosting {
    posting("A", "UI/UX Designer", "DesignHub", "Design")
}

/// Job "B" in the Development category.
pub(super) fn development_job() -> JobPosting {
    let mut job = posting("B", "Senior React Developer", "TechCorp Inc.", "Development");
    job.posted_date = date(2024, 3, 10);
    job
}

pub(super) fn catalog_of(postings: Vec<JobPosting>) -> JobCatalog {
    let mut catalog = JobCatalog::new();
    for posting in postings {
        catalog.upsert(posting).expect("fixture posting is valid");
    }
    catalog
}

pub(super) fn draft(title: &str, category: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        company: "GrowthCo".to_string(),
        location: "San Francisco, CA".to_string(),
        employment_type: "Full-time".to_string(),
        salary: "$90k - $110k".to_string(),
        description: "Own the growth roadmap".to_string(),
        requirements: vec!["Campaign experience".to_string(), "  ".to_string()],
        category: category.to_string(),
        company_description: "Growth agency".to_string(),
    }
}

pub(super) fn submission(job_id: &str, applicant: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        job_id: JobId::new(job_id),
        applicant_name: applicant.to_string(),
        applicant_category: ApplicantCategory::Experienced,
        current_package: Some(70_000),
        expected_package: Some(85_000),
        cover_letter: "I would love to join the team.".to_string(),
        attachment: None,
    }
}

pub(super) fn form(applicant: &str) -> ApplicationForm {
    ApplicationForm {
        applicant_name: applicant.to_string(),
        applicant_category: ApplicantCategory::Fresher,
        current_package: None,
        expected_package: Some(40_000),
        cover_letter: "Fresh graduate eager to learn.".to_string(),
    }
}

pub(super) fn upload(name: &str, bytes: &[u8]) -> AttachmentUpload {
    AttachmentUpload {
        original_name: name.to_string(),
        content_type: None,
        bytes: bytes.to_vec(),
    }
}

pub(super) fn token() -> BearerToken {
    BearerToken::new("seeker-token")
}

#[derive(Default)]
pub(super) struct MemoryRemote {
    pub(super) jobs: Mutex<Vec<JobPosting>>,
    pub(super) applications: Mutex<Vec<Application>>,
    pub(super) submissions: Mutex<Vec<(String, Application)>>,
    pub(super) status_updates: Mutex<Vec<(ApplicationId, ApplicationStatus)>>,
    failure: Mutex<Option<RemoteError>>,
    issued: AtomicUsize,
}

impl MemoryRemote {
    pub(super) fn with_jobs(jobs: Vec<JobPosting>) -> Self {
        let remote = Self::default();
        *remote.jobs.lock().expect("remote mutex poisoned") = jobs;
        remote
    }

    pub(super) fn fail_with(&self, error: RemoteError) {
        *self.failure.lock().expect("remote mutex poisoned") = Some(error);
    }

    pub(super) fn submissions(&self) -> Vec<(String, Application)> {
        self.submissions
            .lock()
            .expect("remote mutex poisoned")
            .clone()
    }

    pub(super) fn status_updates(&self) -> Vec<(ApplicationId, ApplicationStatus)> {
        self.status_updates
            .lock()
            .expect("remote mutex poisoned")
            .clone()
    }

    fn check(&self) -> Result<(), RemoteError> {
        match self.failure.lock().expect("remote mutex poisoned").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl JobBoardRemote for MemoryRemote {
    fn list_jobs(&self) -> Result<Vec<JobPosting>, RemoteError> {
        self.check()?;
        Ok(self.jobs.lock().expect("remote mutex poisoned").clone())
    }

    fn create_job(&self, draft: &JobDraft, posted_on: NaiveDate) -> Result<JobPosting, RemoteError> {
        self.check()?;
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let posting = draft
            .clone()
            .into_posting(JobId(format!("job-{sequence}")), posted_on);
        self.jobs
            .lock()
            .expect("remote mutex poisoned")
            .push(posting.clone());
        Ok(posting)
    }

    fn update_job(&self, posting: &JobPosting) -> Result<(), RemoteError> {
        self.check()?;
        let mut jobs = self.jobs.lock().expect("remote mutex poisoned");
        match jobs.iter_mut().find(|job| job.id == posting.id) {
            Some(job) => *job = posting.clone(),
            None => jobs.push(posting.clone()),
        }
        Ok(())
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RemoteError> {
        self.check()?;
        self.jobs
            .lock()
            .expect("remote mutex poisoned")
            .retain(|job| &job.id != id);
        Ok(())
    }

    fn list_applications(&self) -> Result<Vec<Application>, RemoteError> {
        self.check()?;
        Ok(self
            .applications
            .lock()
            .expect("remote mutex poisoned")
            .clone())
    }

    fn submit_application(
        &self,
        credential: &BearerToken,
        application: &Application,
    ) -> Result<Application, RemoteError> {
        self.check()?;
        self.submissions
            .lock()
            .expect("remote mutex poisoned")
            .push((credential.expose().to_string(), application.clone()));
        self.applications
            .lock()
            .expect("remote mutex poisoned")
            .push(application.clone());
        Ok(application.clone())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RemoteError> {
        self.check()?;
        let mut applications = self.applications.lock().expect("remote mutex poisoned");
        let Some(application) = applications.iter_mut().find(|application| &application.id == id)
        else {
            return Err(RemoteError::Rejected(format!("unknown application {id}")));
        };
        application.status = status;
        self.status_updates
            .lock()
            .expect("remote mutex poisoned")
            .push((id.clone(), status));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryAttachments {
    stored: Mutex<Vec<AttachmentRef>>,
}

impl MemoryAttachments {
    pub(super) fn stored(&self) -> Vec<AttachmentRef> {
        self.stored.lock().expect("attachment mutex poisoned").clone()
    }
}

impl AttachmentStore for MemoryAttachments {
    fn store(&self, upload: AttachmentUpload) -> Result<AttachmentRef, AttachmentError> {
        let mut stored = self.stored.lock().expect("attachment mutex poisoned");
        let filename = format!("cv-{}-{}", stored.len() + 1, upload.original_name);
        let attachment = AttachmentRef {
            path: format!("uploads/{filename}"),
            filename,
            original_name: upload.original_name.clone(),
            mime_type: upload.mime_type(),
            size: upload.size(),
        };
        stored.push(attachment.clone());
        Ok(attachment)
    }
}

pub(super) struct OfflineAttachments;

impl AttachmentStore for OfflineAttachments {
    fn store(&self, _upload: AttachmentUpload) -> Result<AttachmentRef, AttachmentError> {
        Err(AttachmentError::Transport("bucket offline".to_string()))
    }
}

pub(super) type TestBoard = JobBoard<MemoryRemote, MemoryAttachments>;

/// Board seeded with jobs A and B and an empty ledger.
pub(super) fn build_board() -> (TestBoard, Arc<MemoryRemote>, Arc<MemoryAttachments>) {
    let jobs = vec![design_job(), development_job()];
    let remote = Arc::new(MemoryRemote::with_jobs(jobs.clone()));
    let attachments = Arc::new(MemoryAttachments::default());
    let board = JobBoard::with_state(
        remote.clone(),
        attachments.clone(),
        catalog_of(jobs),
        ApplicationLedger::new(),
    );
    (board, remote, attachments)
}

pub(super) fn router_for(board: TestBoard) -> axum::Router {
    board_router(Arc::new(board), DashboardWindow::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Encodes text fields and an optional `cv` file part as `multipart/form-data`.
pub(super) fn multipart_body(fields: &[(&str, &str)], cv: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((file_name, content_type, bytes)) = cv {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"cv\"; filename=\"{file_name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
