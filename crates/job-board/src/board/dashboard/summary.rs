use chrono::NaiveDate;

use super::aggregate::{
    category_shares, count_by_status, count_postings_in_months, trailing_months, weekly_series,
};
use super::views::{ApplicationRow, EmployerDashboard, SeekerDashboard};
use crate::board::applications::{Application, ApplicationLedger};
use crate::board::catalog::JobCatalog;

/// Shown in place of job details when an application refers to a deleted posting.
pub const UNKNOWN_JOB: &str = "Unknown";

impl ApplicationRow {
    pub fn resolve(application: &Application, catalog: &JobCatalog) -> Self {
        let (job_title, company) = match catalog.get(&application.job_id) {
            Some(posting) => (posting.title.clone(), posting.company.clone()),
            None => (UNKNOWN_JOB.to_string(), UNKNOWN_JOB.to_string()),
        };

        Self {
            application_id: application.id.clone(),
            applicant_name: application.applicant_name.clone(),
            applicant_category: application.applicant_category,
            job_id: application.job_id.clone(),
            job_title,
            company,
            current_package: application.current_package,
            expected_package: application.expected_package,
            status: application.status,
            status_label: application.status.label(),
            applied_at: application.applied_at,
            attachment: application.attachment.clone(),
        }
    }
}

pub fn employer_dashboard(
    catalog: &JobCatalog,
    ledger: &ApplicationLedger,
    reference: NaiveDate,
    months: usize,
) -> EmployerDashboard {
    let window = trailing_months(reference, months)
        .into_iter()
        .map(|month| (month.to_string(), month))
        .collect();

    EmployerDashboard {
        reference_date: reference,
        total_jobs: catalog.len(),
        total_applications: ledger.len(),
        status_counts: count_by_status(ledger.list_all()),
        category_shares: category_shares(catalog.iter()),
        monthly_postings: count_postings_in_months(catalog.iter(), window),
        applications: ledger
            .list_all()
            .map(|application| ApplicationRow::resolve(application, catalog))
            .collect(),
    }
}

pub fn seeker_dashboard(
    catalog: &JobCatalog,
    ledger: &ApplicationLedger,
    reference: NaiveDate,
    weeks: usize,
) -> SeekerDashboard {
    SeekerDashboard {
        reference_date: reference,
        total_applications: ledger.len(),
        status_counts: count_by_status(ledger.list_all()),
        weekly_applications: weekly_series(ledger.list_all(), weeks, reference),
        applications: ledger
            .list_all()
            .map(|application| ApplicationRow::resolve(application, catalog))
            .collect(),
    }
}
