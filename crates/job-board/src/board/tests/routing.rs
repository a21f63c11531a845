use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;

use crate::board::router::bearer_credential;
use crate::board::{JobId, MAX_DASHBOARD_WEEKS};

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

fn apply_request(job_id: &str, credential: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::post(format!("/api/v1/jobs/{job_id}/applications")).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(credential) = credential {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {credential}"));
    }
    builder.body(Body::from(body)).expect("request builds")
}

fn apply_fields(applicant_type: &str) -> Vec<(&'static str, String)> {
    vec![
        ("applicantName", "Ana Lima".to_string()),
        ("applicantType", applicant_type.to_string()),
        ("currentPackage", String::new()),
        ("expectedPackage", "45000".to_string()),
        ("coverLetter", "Keen to help design great products.".to_string()),
    ]
}

fn encoded(fields: &[(&'static str, String)], cv: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let borrowed: Vec<(&str, &str)> = fields
        .iter()
        .map(|(name, value)| (*name, value.as_str()))
        .collect();
    multipart_body(&borrowed, cv)
}

#[tokio::test]
async fn search_route_filters_by_category() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .oneshot(get("/api/v1/jobs?category=Design"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let jobs = payload.as_array().expect("array payload");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], "A");
    assert_eq!(jobs[0]["posted_date"], "2024-03-09");
}

#[tokio::test]
async fn search_route_matches_company_names() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .oneshot(get("/api/v1/jobs?search=techcorp&category="))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["company"], "TechCorp Inc.");
}

#[tokio::test]
async fn post_job_route_creates_postings() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs",
            json!({
                "title": "Marketing Manager",
                "company": "GrowthCo",
                "location": "San Francisco, CA",
                "employment_type": "Full-time",
                "requirements": ["5+ years in growth marketing"],
                "category": "Marketing"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["id"], "job-1");

    let categories = router
        .oneshot(get("/api/v1/categories"))
        .await
        .expect("route executes");
    assert_eq!(
        read_json_body(categories).await,
        json!(["Design", "Development", "Marketing"])
    );
}

#[tokio::test]
async fn post_job_route_rejects_blank_fields() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/jobs",
            json!({
                "title": "Marketing Manager",
                "company": " ",
                "location": "Remote",
                "requirements": ["Writing"],
                "category": "Marketing"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("company"));
}

#[tokio::test]
async fn unknown_jobs_are_not_found() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .oneshot(get("/api/v1/jobs/missing"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload.get("error").is_some());
}

#[tokio::test]
async fn edit_and_delete_routes_manage_postings() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let edited = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/jobs/A",
            json!({
                "title": "Lead Designer",
                "company": "DesignHub",
                "location": "New York, NY",
                "requirements": ["Portfolio"],
                "category": "Design"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(edited.status(), StatusCode::OK);
    let payload = read_json_body(edited).await;
    assert_eq!(payload["title"], "Lead Designer");
    assert_eq!(payload["posted_date"], "2024-03-09");

    let deleted = router
        .clone()
        .oneshot(
            Request::delete("/api/v1/jobs/A")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = router
        .oneshot(get("/api/v1/jobs/A"))
        .await
        .expect("route executes");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn apply_requires_a_bearer_credential() {
    let (board, remote, _) = build_board();
    let router = router_for(board);

    let body = encoded(&apply_fields("fresher"), None);
    let response = router
        .oneshot(apply_request("A", None, body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "You must be logged in to apply.");
    assert!(remote.submissions().is_empty());
}

#[tokio::test]
async fn apply_stores_the_cv_and_records_a_pending_application() {
    let (board, remote, attachments) = build_board();
    let router = router_for(board);

    let body = encoded(
        &apply_fields("fresher"),
        Some(("resume.pdf", "application/pdf", &b"%PDF-1.7 cv"[..])),
    );
    let response = router
        .clone()
        .oneshot(apply_request("A", Some("seeker-token"), body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "pending");
    assert_eq!(payload["applicant_category"], "fresher");
    assert_eq!(payload["expected_package"], 45000);
    assert_eq!(payload["current_package"], Value::Null);
    assert_eq!(payload["attachment"]["original_name"], "resume.pdf");
    assert_eq!(payload["attachment"]["mime_type"], "application/pdf");
    assert_eq!(payload["attachment"]["size"], 11);

    assert_eq!(attachments.stored().len(), 1);
    assert_eq!(remote.submissions()[0].0, "seeker-token");

    let listed = router
        .oneshot(get("/api/v1/jobs/A/applications"))
        .await
        .expect("route executes");
    let listed = read_json_body(listed).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn apply_rejects_unknown_applicant_types() {
    let (board, _, attachments) = build_board();
    let router = router_for(board);

    let body = encoded(&apply_fields("veteran"), None);
    let response = router
        .oneshot(apply_request("A", Some("seeker-token"), body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(attachments.stored().is_empty());
}

#[tokio::test]
async fn apply_to_unknown_job_is_not_found() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let body = encoded(&apply_fields("intern"), None);
    let response = router
        .oneshot(apply_request("Z", Some("seeker-token"), body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_route_enforces_the_status_lifecycle() {
    let (board, _, _) = build_board();
    let application = board
        .apply(&token(), &JobId::new("B"), form("Ana"), None, at(2024, 3, 11, 9))
        .expect("application accepted");
    let router = router_for(board);
    let uri = format!("/api/v1/applications/{}/status", application.id);

    let selected = router
        .clone()
        .oneshot(json_request("PUT", &uri, json!({ "status": "selected" })))
        .await
        .expect("route executes");
    assert_eq!(selected.status(), StatusCode::OK);
    assert_eq!(read_json_body(selected).await["status"], "selected");

    let rejected = router
        .clone()
        .oneshot(json_request("PUT", &uri, json!({ "status": "rejected" })))
        .await
        .expect("route executes");
    assert_eq!(rejected.status(), StatusCode::CONFLICT);

    let unknown = router
        .oneshot(json_request("PUT", &uri, json!({ "status": "hired" })))
        .await
        .expect("route executes");
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn employer_dashboard_route_uses_the_requested_window() {
    let (board, _, _) = build_board();
    board
        .apply(&token(), &JobId::new("A"), form("Ana"), None, at(2024, 3, 11, 9))
        .expect("application accepted");
    let router = router_for(board);

    let response = router
        .oneshot(get("/api/v1/dashboard/employer?today=2024-03-15&months=2"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_jobs"], 2);
    assert_eq!(payload["status_counts"]["pending"], 1);
    assert_eq!(payload["status_counts"]["selected"], 0);
    assert_eq!(payload["monthly_postings"][0]["label"], "2024-02");
    assert_eq!(payload["monthly_postings"][1]["postings"], 2);
    assert_eq!(payload["applications"][0]["job_title"], "UI/UX Designer");
}

#[tokio::test]
async fn seeker_dashboard_route_defaults_to_four_weeks() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .oneshot(get("/api/v1/dashboard/seeker?today=2024-03-14"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let weeks = payload["weekly_applications"]
        .as_array()
        .expect("weekly series");
    assert_eq!(weeks.len(), 4);
    assert_eq!(weeks[3]["label"], "Week 4");
    assert_eq!(weeks[3]["end"], "2024-03-14");
}

#[tokio::test]
async fn dashboard_rejects_malformed_reference_dates() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    let response = router
        .oneshot(get("/api/v1/dashboard/seeker?today=14-03-2024"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboards_refuse_oversized_windows() {
    let (board, _, _) = build_board();
    let router = router_for(board);

    for uri in [
        "/api/v1/dashboard/seeker?today=2024-03-14&weeks=200000000000",
        "/api/v1/dashboard/employer?today=2024-03-14&months=18446744073709551615",
    ] {
        let response = router
            .clone()
            .oneshot(get(uri))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .is_some_and(|message| message.contains("may be at most")));
    }

    let widest = format!(
        "/api/v1/dashboard/seeker?today=2024-03-14&weeks={MAX_DASHBOARD_WEEKS}"
    );
    let response = router.oneshot(get(&widest)).await.expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["weekly_applications"]
            .as_array()
            .map(|weeks| weeks.len()),
        Some(MAX_DASHBOARD_WEEKS)
    );
}

#[test]
fn bearer_scheme_is_stripped_from_the_header() {
    let mut headers = HeaderMap::new();
    assert!(bearer_credential(&headers).is_none());

    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("Bearer abc.def"),
    );
    assert_eq!(
        bearer_credential(&headers).map(|token| token.expose().to_string()),
        Some("abc.def".to_string())
    );

    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_static("bearer  lower.case"),
    );
    assert_eq!(
        bearer_credential(&headers).map(|token| token.expose().to_string()),
        Some("lower.case".to_string())
    );

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("BEARER ABC"));
    assert!(bearer_credential(&headers).is_some());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert!(bearer_credential(&headers).is_none());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
    assert!(bearer_credential(&headers).is_none());
}
