use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::board::applications::{
    ApplicantCategory, ApplicationId, ApplicationStatus, AttachmentRef,
};
use crate::board::catalog::JobId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    pub share_pct: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub postings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyCount {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub applications: usize,
}

/// One row of an applications table, with the job resolved through the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRow {
    pub application_id: ApplicationId,
    pub applicant_name: String,
    pub applicant_category: ApplicantCategory,
    pub job_id: JobId,
    pub job_title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_package: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_package: Option<u64>,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDashboard {
    pub reference_date: NaiveDate,
    pub total_jobs: usize,
    pub total_applications: usize,
    pub status_counts: BTreeMap<ApplicationStatus, usize>,
    pub category_shares: Vec<CategoryShare>,
    pub monthly_postings: Vec<MonthlyCount>,
    pub applications: Vec<ApplicationRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeekerDashboard {
    pub reference_date: NaiveDate,
    pub total_applications: usize,
    pub status_counts: BTreeMap<ApplicationStatus, usize>,
    pub weekly_applications: Vec<WeeklyCount>,
    pub applications: Vec<ApplicationRow>,
}
