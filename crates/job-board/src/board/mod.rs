//! Job board state: the posting catalog, the application ledger, dashboard aggregation,
//! and the composition root that wires them to the remote API and attachment store.
//!
//! The catalog and ledger are plain owned collections with synchronous operations. All
//! external I/O goes through the collaborator traits in [`remote`], so the core can be
//! exercised in isolation with in-memory implementations.

pub mod applications;
pub mod catalog;
pub mod dashboard;
pub mod remote;
pub mod router;
mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use applications::{
    ApplicantCategory, Application, ApplicationId, ApplicationLedger, ApplicationStatus,
    ApplicationSubmission, AttachmentRef, LedgerError,
};
pub use catalog::{CatalogError, CatalogImportError, JobCatalog, JobDraft, JobId, JobPosting};
pub use dashboard::{EmployerDashboard, SeekerDashboard};
pub use remote::{
    AttachmentError, AttachmentStore, AttachmentUpload, BearerToken, JobBoardRemote, RemoteError,
};
pub use router::{board_router, DashboardWindow, MAX_DASHBOARD_MONTHS, MAX_DASHBOARD_WEEKS};
pub use service::{ApplicationForm, ErrorKind, JobBoard, JobBoardError, RefreshSummary};
pub use validation::ValidationError;
