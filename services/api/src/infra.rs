use chrono::NaiveDate;
use job_board::board::catalog::parse_postings;
use job_board::board::validation::parse_calendar_date;
use job_board::board::{
    Application, ApplicationId, ApplicationStatus, AttachmentError,
    AttachmentRef, AttachmentStore, AttachmentUpload, BearerToken, JobBoardRemote, JobDraft,
    JobId, JobPosting, RemoteError,
};
use job_board::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the remote job/application API.
#[derive(Default, Clone)]
pub(crate) struct InMemoryJobBoardRemote {
    jobs: Arc<Mutex<Vec<JobPosting>>>,
    applications: Arc<Mutex<Vec<Application>>>,
}

impl InMemoryJobBoardRemote {
    pub(crate) fn with_postings(postings: Vec<JobPosting>) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(postings)),
            ..Self::default()
        }
    }

    pub(crate) fn application_count(&self) -> usize {
        self.applications
            .lock()
            .expect("remote mutex poisoned")
            .len()
    }

    pub(crate) fn status_of(&self, id: &ApplicationId) -> Option<ApplicationStatus> {
        self.applications
            .lock()
            .expect("remote mutex poisoned")
            .iter()
            .find(|application| &application.id == id)
            .map(|application| application.status)
    }
}

impl JobBoardRemote for InMemoryJobBoardRemote {
    fn list_jobs(&self) -> Result<Vec<JobPosting>, RemoteError> {
        Ok(self.jobs.lock().expect("remote mutex poisoned").clone())
    }

    fn create_job(&self, draft: &JobDraft, posted_on: NaiveDate) -> Result<JobPosting, RemoteError> {
        let mut jobs = self.jobs.lock().expect("remote mutex poisoned");
        let mut sequence = jobs.len() + 1;
        let id = loop {
            let candidate = JobId(format!("job-{sequence}"));
            if !jobs.iter().any(|job| job.id == candidate) {
                break candidate;
            }
            sequence += 1;
        };

        let posting = draft.clone().into_posting(id, posted_on);
        jobs.push(posting.clone());
        Ok(posting)
    }

    fn update_job(&self, posting: &JobPosting) -> Result<(), RemoteError> {
        let mut jobs = self.jobs.lock().expect("remote mutex poisoned");
        match jobs.iter_mut().find(|job| job.id == posting.id) {
            Some(job) => {
                *job = posting.clone();
                Ok(())
            }
            None => Err(RemoteError::Rejected(format!("job {} does not exist", posting.id))),
        }
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RemoteError> {
        self.jobs
            .lock()
            .expect("remote mutex poisoned")
            .retain(|job| &job.id != id);
        Ok(())
    }

    fn list_applications(&self) -> Result<Vec<Application>, RemoteError> {
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
        if credential.expose().trim().is_empty() {
            return Err(RemoteError::Unauthorized);
        }
        let mut applications = self.applications.lock().expect("remote mutex poisoned");
        if applications.iter().any(|stored| stored.id == application.id) {
            return Err(RemoteError::Rejected(format!(
                "application {} already exists",
                application.id
            )));
        }
        applications.push(application.clone());
        Ok(application.clone())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RemoteError> {
        let mut applications = self.applications.lock().expect("remote mutex poisoned");
        match applications.iter_mut().find(|application| &application.id == id) {
            Some(application) => {
                application.status = status;
                Ok(())
            }
            None => Err(RemoteError::Rejected(format!("application {id} does not exist"))),
        }
    }
}

/// Keeps uploaded CVs in memory, keyed by their stored file name.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAttachmentStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryAttachmentStore {
    pub(crate) fn len(&self) -> usize {
        self.blobs.lock().expect("attachment mutex poisoned").len()
    }
}

impl AttachmentStore for InMemoryAttachmentStore {
    fn store(&self, upload: AttachmentUpload) -> Result<AttachmentRef, AttachmentError> {
        let mime_type = upload.mime_type();
        let size = upload.size();
        let mut blobs = self.blobs.lock().expect("attachment mutex poisoned");

        let safe_name: String = upload
            .original_name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        let filename = format!("cv-{:04}-{}", blobs.len() + 1, safe_name);
        let path = format!("uploads/{filename}");
        blobs.insert(filename.clone(), upload.bytes);

        Ok(AttachmentRef {
            filename,
            path,
            original_name: upload.original_name,
            mime_type,
            size,
        })
    }
}

/// Postings served when no seed export is configured.
pub(crate) fn demo_postings() -> Vec<JobPosting> {
    let date = |raw: &str| parse_calendar_date(raw).unwrap_or(NaiveDate::MIN);
    vec![
        JobPosting {
            id: JobId::new("1"),
            title: "Senior React Developer".to_string(),
            company: "TechCorp Inc.".to_string(),
            location: "Remote".to_string(),
            employment_type: "Full-time".to_string(),
            salary: "$120k - $150k".to_string(),
            description: "Build and maintain the customer-facing dashboard.".to_string(),
            requirements: vec![
                "5+ years of React experience".to_string(),
                "TypeScript".to_string(),
                "Strong communication skills".to_string(),
            ],
            category: "Development".to_string(),
            posted_date: date("2024-03-10"),
            company_description: "Cloud tooling for logistics teams.".to_string(),
        },
        JobPosting {
            id: JobId::new("2"),
            title: "UI/UX Designer".to_string(),
            company: "DesignHub".to_string(),
            location: "New York, NY".to_string(),
            employment_type: "Full-time".to_string(),
            salary: "$90k - $110k".to_string(),
            description: "Own the design system and run user research.".to_string(),
            requirements: vec![
                "Portfolio of shipped products".to_string(),
                "Figma".to_string(),
            ],
            category: "Design".to_string(),
            posted_date: date("2024-03-09"),
            company_description: "Product design studio.".to_string(),
        },
        JobPosting {
            id: JobId::new("3"),
            title: "Marketing Manager".to_string(),
            company: "GrowthCo".to_string(),
            location: "San Francisco, CA".to_string(),
            employment_type: "Full-time".to_string(),
            salary: "$100k - $130k".to_string(),
            description: "Lead acquisition campaigns across channels.".to_string(),
            requirements: vec![
                "5+ years in growth marketing".to_string(),
                "Analytics".to_string(),
            ],
            category: "Marketing".to_string(),
            posted_date: date("2024-03-08"),
            company_description: "Growth agency for consumer brands.".to_string(),
        },
    ]
}

/// Seed postings from a CSV export, or the demo postings when no path is given.
pub(crate) fn seed_postings(path: Option<&Path>) -> Result<Vec<JobPosting>, AppError> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            Ok(parse_postings(file)?)
        }
        None => Ok(demo_postings()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(raw).map_err(|err| err.to_string())
}
