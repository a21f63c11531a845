use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

use super::views::{CategoryShare, MonthlyCount, WeeklyCount};
use crate::board::applications::{Application, ApplicationStatus};
use crate::board::catalog::JobPosting;
use crate::board::validation::{parse_calendar_date, ValidationError};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month before, or `None` before the earliest representable date.
    pub fn previous(self) -> Option<Self> {
        if self.month > 1 {
            return Some(Self {
                year: self.year,
                month: self.month - 1,
            });
        }
        if self.year <= NaiveDate::MIN.year() {
            return None;
        }
        Some(Self {
            year: self.year - 1,
            month: 12,
        })
    }

    pub fn abbreviation(self) -> &'static str {
        MONTH_ABBREVIATIONS[(self.month - 1) as usize]
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Counts applications per status; every status is present, zero when unseen.
pub fn count_by_status<'a, I>(applications: I) -> BTreeMap<ApplicationStatus, usize>
where
    I: IntoIterator<Item = &'a Application>,
{
    let mut counts: BTreeMap<ApplicationStatus, usize> =
        ApplicationStatus::ALL.iter().map(|status| (*status, 0)).collect();

    for application in applications {
        *counts.entry(application.status).or_insert(0) += 1;
    }

    counts
}

/// Counts postings per category; only observed categories appear.
pub fn count_by_category<'a, I>(postings: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut counts = BTreeMap::new();
    for posting in postings {
        *counts.entry(posting.category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Category counts with each category's percentage of all postings.
pub fn category_shares<'a, I>(postings: I) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let counts = count_by_category(postings);
    let total: usize = counts.values().sum();

    counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            share_pct: if total == 0 {
                0.0
            } else {
                (count as f32 / total as f32) * 100.0
            },
        })
        .collect()
}

/// Resolves a chart label to a month.
///
/// `YYYY-MM` labels are absolute. Month names (`Jan`, `january`, `Sept`) resolve to the most
/// recent such month that does not fall after `reference`.
pub fn resolve_month_label(
    label: &str,
    reference: NaiveDate,
) -> Result<YearMonth, ValidationError> {
    let malformed = || ValidationError::MalformedMonth {
        label: label.to_string(),
    };
    let trimmed = label.trim();

    if let Some((year, month)) = trimmed.split_once('-') {
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) {
            return Err(malformed());
        }
        return Ok(YearMonth { year, month });
    }

    let lowered = trimmed.to_lowercase();
    if lowered.len() < 3 {
        return Err(malformed());
    }

    let month = MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&lowered))
        .map(|index| index as u32 + 1)
        .ok_or_else(malformed)?;

    let current = YearMonth::of(reference);
    let year = if month <= current.month {
        current.year
    } else {
        current.year - 1
    };

    Ok(YearMonth { year, month })
}

/// Counts postings per labelled month. See [`resolve_month_label`] for label rules.
pub fn monthly_series<'a, I, S>(
    postings: I,
    month_labels: &[S],
    reference: NaiveDate,
) -> Result<Vec<MonthlyCount>, ValidationError>
where
    I: IntoIterator<Item = &'a JobPosting>,
    S: AsRef<str>,
{
    let months = month_labels
        .iter()
        .map(|label| {
            resolve_month_label(label.as_ref(), reference)
                .map(|month| (label.as_ref().trim().to_string(), month))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(count_postings_in_months(postings, months))
}

/// The `count` months ending at the reference month, oldest first.
///
/// Stops early at the earliest representable month.
pub fn trailing_months(reference: NaiveDate, count: usize) -> Vec<YearMonth> {
    let mut months: Vec<YearMonth> =
        std::iter::successors(Some(YearMonth::of(reference)), |month| month.previous())
            .take(count)
            .collect();
    months.reverse();
    months
}

/// Month abbreviations for the trailing window, as used on chart axes.
pub fn trailing_month_labels(reference: NaiveDate, count: usize) -> Vec<&'static str> {
    trailing_months(reference, count)
        .into_iter()
        .map(YearMonth::abbreviation)
        .collect()
}

pub(crate) fn count_postings_in_months<'a, I>(
    postings: I,
    months: Vec<(String, YearMonth)>,
) -> Vec<MonthlyCount>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    let mut series: Vec<MonthlyCount> = months
        .into_iter()
        .map(|(label, month)| MonthlyCount {
            label,
            year: month.year,
            month: month.month,
            month_name: month.abbreviation(),
            postings: 0,
        })
        .collect();

    for posting in postings {
        let posted = YearMonth::of(posting.posted_date);
        for point in series.iter_mut() {
            if point.year == posted.year && point.month == posted.month {
                point.postings += 1;
            }
        }
    }

    series
}

/// Counts applications per trailing 7-day window ending at `reference`, oldest window first.
///
/// Windows that would start before the earliest representable date are left out.
pub fn weekly_series<'a, I>(
    applications: I,
    weeks: usize,
    reference: NaiveDate,
) -> Vec<WeeklyCount>
where
    I: IntoIterator<Item = &'a Application>,
{
    let mut windows = Vec::new();
    let mut end = Some(reference);
    while let Some(window_end) = end.filter(|_| windows.len() < weeks) {
        let Some(start) = window_end.checked_sub_signed(Duration::days(6)) else {
            break;
        };
        windows.push((start, window_end));
        end = start.checked_sub_signed(Duration::days(1));
    }
    windows.reverse();

    let mut series: Vec<WeeklyCount> = windows
        .into_iter()
        .enumerate()
        .map(|(index, (start, end))| WeeklyCount {
            label: format!("Week {}", index + 1),
            start,
            end,
            applications: 0,
        })
        .collect();

    for application in applications {
        let applied_on = application.applied_at.date_naive();
        if let Some(window) = series
            .iter_mut()
            .find(|window| window.start <= applied_on && applied_on <= window.end)
        {
            window.applications += 1;
        }
    }

    series
}

/// Parses a posting date string from an external source.
pub fn parse_posted_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    parse_calendar_date(raw)
}
