use crate::infra::{demo_postings, InMemoryAttachmentStore, InMemoryJobBoardRemote};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::Args;
use job_board::board::dashboard::{employer_dashboard, seeker_dashboard};
use job_board::board::{
    ApplicantCategory, ApplicationForm, ApplicationLedger, ApplicationStatus, AttachmentUpload,
    BearerToken, DashboardWindow, EmployerDashboard, JobBoard, JobBoardError, JobCatalog,
    JobDraft, JobPosting, SeekerDashboard,
};
use job_board::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct JobSearchArgs {
    /// CSV export of postings
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Case-insensitive text matched against title and company
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// Exact category (case-insensitive); empty matches all
    #[arg(long, default_value = "")]
    pub(crate) category: String,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// CSV export of postings
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Number of months in the postings chart
    #[arg(long, default_value_t = 6)]
    pub(crate) months: usize,
    /// Number of weeks in the applications chart
    #[arg(long, default_value_t = 4)]
    pub(crate) weeks: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_job_search(args: JobSearchArgs) -> Result<(), AppError> {
    let catalog = JobCatalog::from_path(&args.csv)?;
    let matches: Vec<&JobPosting> = catalog.query(&args.search, &args.category).collect();

    println!(
        "{} of {} postings match (search '{}', category '{}')",
        matches.len(),
        catalog.len(),
        args.search,
        args.category
    );
    for posting in matches {
        render_posting(posting);
    }
    Ok(())
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let window = DashboardWindow {
        months: args.months,
        weeks: args.weeks,
    }
    .checked()
    .map_err(JobBoardError::from)?;
    let catalog = JobCatalog::from_path(&args.csv)?;
    let ledger = ApplicationLedger::new();
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    render_employer_dashboard(&employer_dashboard(&catalog, &ledger, today, window.months));
    render_seeker_dashboard(&seeker_dashboard(&catalog, &ledger, today, window.weeks));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = today
        .and_hms_opt(12, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_else(Utc::now);

    println!("Job board demo ({today})");
    let remote = Arc::new(InMemoryJobBoardRemote::with_postings(demo_postings()));
    let attachments = Arc::new(InMemoryAttachmentStore::default());
    let board = JobBoard::new(remote.clone(), attachments.clone());
    let summary = board.refresh()?;
    println!(
        "- Loaded {} postings ({} skipped)",
        summary.jobs_loaded, summary.jobs_skipped
    );

    let posted = board.post_job(
        JobDraft {
            title: "Content Strategist".to_string(),
            company: "GrowthCo".to_string(),
            location: "Remote".to_string(),
            employment_type: "Part-time".to_string(),
            salary: "$60k".to_string(),
            description: "Plan the editorial calendar.".to_string(),
            requirements: vec!["Editorial planning".to_string(), "SEO".to_string()],
            category: "Marketing".to_string(),
            company_description: "Growth agency for consumer brands.".to_string(),
        },
        today,
    )?;
    println!("- Employer posted {} -> id {}", posted.title, posted.id);

    println!("\nCategories: {}", board.categories().join(", "));
    println!("Search 'design' in all categories:");
    for posting in board.search("design", "") {
        render_posting(&posting);
    }
    println!("Search '' in Marketing:");
    for posting in board.search("", "Marketing") {
        render_posting(&posting);
    }

    println!("\nApplications");
    let credential = BearerToken::new("demo-session-token");
    let first_job = board.search("react", "").into_iter().next();
    let Some(first_job) = first_job else {
        println!("  No React posting available; skipping applications");
        return Ok(());
    };

    let selected = board.apply(
        &credential,
        &first_job.id,
        ApplicationForm {
            applicant_name: "Ana Lima".to_string(),
            applicant_category: ApplicantCategory::Experienced,
            current_package: Some(95_000),
            expected_package: Some(120_000),
            cover_letter: "Six years shipping React dashboards.".to_string(),
        },
        Some(AttachmentUpload {
            original_name: "ana-lima-cv.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.7 demo".to_vec(),
        }),
        now,
    )?;
    let rejected = board.apply(
        &credential,
        &posted.id,
        ApplicationForm {
            applicant_name: "Ben Okafor".to_string(),
            applicant_category: ApplicantCategory::Fresher,
            current_package: None,
            expected_package: Some(45_000),
            cover_letter: "Recent graduate who writes every day.".to_string(),
        },
        None,
        now,
    )?;
    println!(
        "- {} applied to {} ({} attachment(s) stored)",
        selected.applicant_name,
        first_job.title,
        attachments.len()
    );
    println!("- {} applied to {}", rejected.applicant_name, posted.title);

    board.review(&selected.id, ApplicationStatus::Selected)?;
    board.review(&rejected.id, ApplicationStatus::Rejected)?;
    println!(
        "- Remote now has {} application(s); {} is {}",
        remote.application_count(),
        selected.id,
        remote
            .status_of(&selected.id)
            .map(ApplicationStatus::label)
            .unwrap_or("unknown")
    );

    match board.review(&selected.id, ApplicationStatus::Rejected) {
        Ok(_) => println!("  Unexpected: terminal status changed"),
        Err(err) => println!("  Second review refused: {err}"),
    }

    board.delete_job(&posted.id)?;
    println!("- Deleted {}; its applications are kept", posted.id);

    let reloaded = board.refresh()?;
    println!(
        "- Reloaded {} postings and {} application(s) from the remote",
        reloaded.jobs_loaded, reloaded.applications_loaded
    );

    println!();
    render_employer_dashboard(&board.employer_dashboard(today, 6));
    println!();
    let seeker = board.seeker_dashboard(today, 4);
    render_seeker_dashboard(&seeker);

    if let Some(row) = seeker.applications.first() {
        match serde_json::to_string_pretty(row) {
            Ok(json) => println!("  Application row payload:\n{json}"),
            Err(err) => println!("  Application row payload unavailable: {err}"),
        }
    }

    Ok(())
}

fn render_posting(posting: &JobPosting) {
    println!(
        "  - [{}] {} @ {} | {} | {} | {} | posted {}",
        posting.id,
        posting.title,
        posting.company,
        posting.location,
        posting.category,
        posting.salary,
        posting.posted_date
    );
}

fn render_employer_dashboard(dashboard: &EmployerDashboard) {
    println!("Employer dashboard (as of {})", dashboard.reference_date);
    println!(
        "- {} jobs | {} applications",
        dashboard.total_jobs, dashboard.total_applications
    );
    for (status, count) in &dashboard.status_counts {
        println!("  - {status}: {count}");
    }
    println!("Category mix:");
    for share in &dashboard.category_shares {
        println!(
            "  - {}: {} ({:.0}%)",
            share.category, share.count, share.share_pct
        );
    }
    println!("Postings per month:");
    for point in &dashboard.monthly_postings {
        println!("  - {} {}: {}", point.month_name, point.year, point.postings);
    }
    if !dashboard.applications.is_empty() {
        println!("Applications:");
        for row in &dashboard.applications {
            println!(
                "  - {} ({}) -> {} @ {} [{}]",
                row.applicant_name,
                row.applicant_category.label(),
                row.job_title,
                row.company,
                row.status_label
            );
        }
    }
}

fn render_seeker_dashboard(dashboard: &SeekerDashboard) {
    println!("Seeker dashboard (as of {})", dashboard.reference_date);
    println!("- {} applications", dashboard.total_applications);
    for week in &dashboard.weekly_applications {
        println!(
            "  - {} ({} -> {}): {}",
            week.label, week.start, week.end, week.applications
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_board::board::ErrorKind;

    #[test]
    fn demo_runs_against_in_memory_collaborators() {
        let args = DemoArgs {
            today: NaiveDate::from_ymd_opt(2024, 3, 15),
        };
        run_demo(args).expect("demo completes");
    }

    #[test]
    fn search_reports_missing_exports() {
        let args = JobSearchArgs {
            csv: PathBuf::from("does/not/exist.csv"),
            search: String::new(),
            category: String::new(),
        };
        assert!(matches!(run_job_search(args), Err(AppError::Import(_))));
    }

    #[test]
    fn dashboard_refuses_oversized_windows() {
        let args = DashboardArgs {
            csv: PathBuf::from("does/not/exist.csv"),
            today: None,
            months: 6,
            weeks: usize::MAX,
        };
        match run_dashboard(args) {
            Err(AppError::Board(err)) => assert_eq!(err.kind(), ErrorKind::Validation),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}
