use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::warn;

use super::applications::{
    parse_compensation, ApplicantCategory, ApplicationId, ApplicationStatus,
};
use super::catalog::{JobDraft, JobId};
use super::remote::{AttachmentStore, AttachmentUpload, BearerToken, JobBoardRemote};
use super::service::{ApplicationForm, ErrorKind, JobBoard, JobBoardError};
use super::validation::{parse_calendar_date, ValidationError};
use crate::error::AppError;

const DEFAULT_DASHBOARD_MONTHS: usize = 6;
const DEFAULT_DASHBOARD_WEEKS: usize = 4;
/// Largest postings chart a dashboard will build (ten years).
pub const MAX_DASHBOARD_MONTHS: usize = 120;
/// Largest applications chart a dashboard will build (about five years).
pub const MAX_DASHBOARD_WEEKS: usize = 260;

/// Chart windows used when a dashboard request does not specify one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindow {
    pub months: usize,
    pub weeks: usize,
}

impl DashboardWindow {
    /// Rejects windows larger than [`MAX_DASHBOARD_MONTHS`] or [`MAX_DASHBOARD_WEEKS`].
    pub fn checked(self) -> Result<Self, ValidationError> {
        Ok(Self {
            months: check_months(self.months)?,
            weeks: check_weeks(self.weeks)?,
        })
    }
}

pub(crate) fn check_months(months: usize) -> Result<usize, ValidationError> {
    check_window("months", months, MAX_DASHBOARD_MONTHS)
}

pub(crate) fn check_weeks(weeks: usize) -> Result<usize, ValidationError> {
    check_window("weeks", weeks, MAX_DASHBOARD_WEEKS)
}

fn check_window(field: &'static str, value: usize, max: usize) -> Result<usize, ValidationError> {
    if value > max {
        Err(ValidationError::WindowTooLarge { field, max, value })
    } else {
        Ok(value)
    }
}

impl Default for DashboardWindow {
    fn default() -> Self {
        Self {
            months: DEFAULT_DASHBOARD_MONTHS,
            weeks: DEFAULT_DASHBOARD_WEEKS,
        }
    }
}

pub(crate) struct BoardState<R, S> {
    board: Arc<JobBoard<R, S>>,
    window: DashboardWindow,
}

impl<R, S> Clone for BoardState<R, S> {
    fn clone(&self) -> Self {
        Self {
            board: Arc::clone(&self.board),
            window: self.window,
        }
    }
}

/// Router builder exposing the job board over HTTP.
pub fn board_router<R, S>(board: Arc<JobBoard<R, S>>, window: DashboardWindow) -> Router
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(search_handler::<R, S>).post(post_job_handler::<R, S>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(job_handler::<R, S>)
                .put(edit_job_handler::<R, S>)
                .delete(delete_job_handler::<R, S>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler::<R, S>).post(apply_handler::<R, S>),
        )
        .route("/api/v1/applications", get(applications_handler::<R, S>))
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<R, S>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(review_handler::<R, S>),
        )
        .route("/api/v1/categories", get(categories_handler::<R, S>))
        .route(
            "/api/v1/dashboard/employer",
            get(employer_dashboard_handler::<R, S>),
        )
        .route(
            "/api/v1/dashboard/seeker",
            get(seeker_dashboard_handler::<R, S>),
        )
        .with_state(BoardState { board, window })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    search: String,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardParams {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    today: Option<NaiveDate>,
    months: Option<usize>,
    weeks: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: String,
}

pub(crate) async fn search_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    let jobs = state.board.search(&params.search, &params.category);
    (StatusCode::OK, Json(jobs)).into_response()
}

pub(crate) async fn post_job_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    match state.board.post_job(draft, Utc::now().date_naive()) {
        Ok(posting) => (StatusCode::CREATED, Json(posting)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn job_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    match state.board.job(&JobId(job_id)) {
        Ok(posting) => (StatusCode::OK, Json(posting)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn edit_job_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(job_id): Path<String>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    match state.board.edit_job(&JobId(job_id), draft) {
        Ok(posting) => (StatusCode::OK, Json(posting)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_job_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    match state.board.delete_job(&JobId(job_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn job_applications_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    let applications = state.board.applications_for(&JobId(job_id));
    (StatusCode::OK, Json(applications)).into_response()
}

pub(crate) async fn apply_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    let Some(credential) = bearer_credential(&headers) else {
        let payload = json!({ "error": "You must be logged in to apply." });
        return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
    };

    let (form, upload) = match read_application_form(multipart).await {
        Ok(parsed) => parsed,
        Err(ApplyFormError::Validation(err)) => return error_response(err.into()),
        Err(ApplyFormError::Multipart(err)) => {
            let payload = json!({ "error": format!("malformed form data: {err}") });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match state
        .board
        .apply(&credential, &JobId(job_id), form, upload, Utc::now())
    {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn applications_handler<R, S>(State(state): State<BoardState<R, S>>) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    (StatusCode::OK, Json(state.board.applications())).into_response()
}

pub(crate) async fn application_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    match state.board.application(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn review_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Path(application_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    let status = match change.status.parse::<ApplicationStatus>() {
        Ok(status) => status,
        Err(err) => return error_response(err.into()),
    };

    match state.board.review(&ApplicationId(application_id), status) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn categories_handler<R, S>(State(state): State<BoardState<R, S>>) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    (StatusCode::OK, Json(state.board.categories())).into_response()
}

pub(crate) async fn employer_dashboard_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Query(params): Query<DashboardParams>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    let today = params.today.unwrap_or_else(|| Utc::now().date_naive());
    let months = match check_months(params.months.unwrap_or(state.window.months)) {
        Ok(months) => months,
        Err(err) => return error_response(err.into()),
    };
    let dashboard = state.board.employer_dashboard(today, months);
    (StatusCode::OK, Json(dashboard)).into_response()
}

pub(crate) async fn seeker_dashboard_handler<R, S>(
    State(state): State<BoardState<R, S>>,
    Query(params): Query<DashboardParams>,
) -> Response
where
    R: JobBoardRemote + 'static,
    S: AttachmentStore + 'static,
{
    let today = params.today.unwrap_or_else(|| Utc::now().date_naive());
    let weeks = match check_weeks(params.weeks.unwrap_or(state.window.weeks)) {
        Ok(weeks) => weeks,
        Err(err) => return error_response(err.into()),
    };
    let dashboard = state.board.seeker_dashboard(today, weeks);
    (StatusCode::OK, Json(dashboard)).into_response()
}

pub(crate) fn error_response(err: JobBoardError) -> Response {
    if err.kind() == ErrorKind::Upstream {
        warn!(error = %err, "upstream collaborator failed");
    }
    AppError::from(err).into_response()
}

/// Extracts the credential from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_credential(headers: &HeaderMap) -> Option<BearerToken> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(BearerToken::new)
}

pub(crate) enum ApplyFormError {
    Multipart(MultipartError),
    Validation(ValidationError),
}

impl From<MultipartError> for ApplyFormError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl From<ValidationError> for ApplyFormError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Reads the apply form: `applicantName`, `applicantType`, `currentPackage`,
/// `expectedPackage`, `coverLetter`, and an optional `cv` file part.
pub(crate) async fn read_application_form(
    mut multipart: Multipart,
) -> Result<(ApplicationForm, Option<AttachmentUpload>), ApplyFormError> {
    let mut applicant_name = String::new();
    let mut applicant_type: Option<String> = None;
    let mut current_package = String::new();
    let mut expected_package = String::new();
    let mut cover_letter = String::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "applicantName" => applicant_name = field.text().await?,
            "applicantType" => applicant_type = Some(field.text().await?),
            "currentPackage" => current_package = field.text().await?,
            "expectedPackage" => expected_package = field.text().await?,
            "coverLetter" => cover_letter = field.text().await?,
            "cv" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !(original_name.is_empty() && bytes.is_empty()) {
                    upload = Some(AttachmentUpload {
                        original_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let applicant_category = applicant_type
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::MissingField {
            field: "applicant_category",
        })?
        .parse::<ApplicantCategory>()?;

    let form = ApplicationForm {
        applicant_name,
        applicant_category,
        current_package: parse_compensation("current_package", &current_package)?,
        expected_package: parse_compensation("expected_package", &expected_package)?,
        cover_letter,
    };

    Ok((form, upload))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_calendar_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
