mod aggregate;
mod summary;
pub mod views;

pub use aggregate::{
    category_shares, count_by_category, count_by_status, monthly_series, parse_posted_date,
    resolve_month_label, trailing_month_labels, trailing_months, weekly_series, YearMonth,
};
pub use summary::{employer_dashboard, seeker_dashboard, UNKNOWN_JOB};
pub use views::{
    ApplicationRow, CategoryShare, EmployerDashboard, MonthlyCount, SeekerDashboard, WeeklyCount,
};
