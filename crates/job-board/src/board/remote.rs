use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::applications::{Application, ApplicationId, ApplicationStatus, AttachmentRef};
use super::catalog::{JobDraft, JobId, JobPosting};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Opaque credential issued by the authentication provider.
///
/// The board never inspects it; it is only forwarded on submission calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Remote job/application API acting as the board's data source and sink.
pub trait JobBoardRemote: Send + Sync {
    fn list_jobs(&self) -> Result<Vec<JobPosting>, RemoteError>;
    /// Creates a posting; the remote assigns the identifier.
    fn create_job(&self, draft: &JobDraft, posted_on: NaiveDate)
        -> Result<JobPosting, RemoteError>;
    fn update_job(&self, posting: &JobPosting) -> Result<(), RemoteError>;
    fn delete_job(&self, id: &JobId) -> Result<(), RemoteError>;
    fn list_applications(&self) -> Result<Vec<Application>, RemoteError>;
    /// Submits a `pending` application carrying the board-assigned id; returns the record the
    /// remote stored.
    fn submit_application(
        &self,
        credential: &BearerToken,
        application: &Application,
    ) -> Result<Application, RemoteError>;
    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RemoteError>;
}

/// Error enumeration for remote API failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote API unavailable: {0}")]
    Unavailable(String),
    #[error("remote API rejected the request: {0}")]
    Rejected(String),
    #[error("remote API refused the credential")]
    Unauthorized,
}

/// File blob handed to the attachment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AttachmentUpload {
    /// The declared content type when it parses, else a guess from the file name.
    pub fn mime_type(&self) -> String {
        self.content_type
            .as_deref()
            .and_then(|raw| raw.parse::<mime::Mime>().ok())
            .or_else(|| mime_guess::from_path(&self.original_name).first())
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MIME.to_string())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Stores uploaded files and hands back a reference for the application record.
pub trait AttachmentStore: Send + Sync {
    fn store(&self, upload: AttachmentUpload) -> Result<AttachmentRef, AttachmentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    #[error("attachment {0} is empty")]
    Empty(String),
    #[error("attachment store unavailable: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>) -> AttachmentUpload {
        AttachmentUpload {
            original_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    #[test]
    fn declared_content_type_wins() {
        let upload = upload("cv.bin", Some("application/pdf; charset=binary"));
        assert_eq!(upload.mime_type(), "application/pdf");
        assert_eq!(upload.size(), 8);
    }

    #[test]
    fn falls_back_to_extension_then_octet_stream() {
        assert_eq!(upload("resume.pdf", Some("not a mime")).mime_type(), "application/pdf");
        assert_eq!(upload("resume", None).mime_type(), FALLBACK_MIME);
    }

    #[test]
    fn credential_is_redacted_in_debug_output() {
        let token = BearerToken::new("secret-token");
        assert_eq!(format!("{token:?}"), "BearerToken(***)");
        assert_eq!(token.expose(), "secret-token");
    }
}
