//! Application intake and the one-way review lifecycle.

pub mod domain;
mod ledger;

pub use domain::{
    parse_compensation, ApplicantCategory, Application, ApplicationId, ApplicationStatus,
    ApplicationSubmission, AttachmentRef,
};
pub use ledger::{ApplicationLedger, LedgerError};
