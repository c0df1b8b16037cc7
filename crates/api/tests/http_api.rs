//! HTTP-level tests for authentication and request rejection.
//!
//! Every case here is decided before the database is touched.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, get_auth, post_json};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_rejected_with_envelope() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/projects").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["data"].is_null());
    assert_eq!(json["status"], 401);
    assert_eq!(json["message"], "Missing Authorization header");
    assert_eq!(json["errors"][0], "Missing Authorization header");
    assert_eq!(json["validationErrors"], serde_json::json!({}));
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let app = common::build_test_app();
    let request = Request::builder()
        .uri("/api/v1/tasks")
        .header("authorization", "Token abc")
        .body(Body::empty())
        .unwrap();

    let response = common::send(app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = common::build_test_app();
    let request = Request::builder()
        .uri("/api/v1/audit-logs")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();

    let response = common::send(app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn mutation_without_token_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/projects",
        serde_json::json!({ "name": "Apollo" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Input rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_project_status_is_bad_request() {
    let app = common::build_test_app();
    let response = get_auth(app, "/api/v1/projects/status/ARCHIVED", 1).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
    assert!(json["message"].as_str().unwrap().contains("ARCHIVED"));
}

#[tokio::test]
async fn unknown_task_status_is_bad_request() {
    let app = common::build_test_app();
    let response = get_auth(app, "/api/v1/tasks/user/1/project/1/status/bogus", 1).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_positive_id_is_bad_request() {
    let app = common::build_test_app();
    let response = get_auth(app, "/api/v1/projects/0", 1).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("project_id"));
}

#[tokio::test]
async fn complete_with_negative_task_id_is_bad_request() {
    let app = common::build_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/tasks/-5/complete")
        .header("authorization", common::bearer(1))
        .body(Body::empty())
        .unwrap();

    let response = common::send(app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Extractor rejections
// ---------------------------------------------------------------------------

fn assert_bad_request_envelope(json: &serde_json::Value) {
    assert!(json["data"].is_null());
    assert_eq!(json["status"], 400);
    assert!(!json["message"].as_str().unwrap().is_empty());
    assert_eq!(json["errors"][0], json["message"]);
    assert_eq!(json["validationErrors"], serde_json::json!({}));
}

#[tokio::test]
async fn mistyped_json_body_returns_envelope() {
    let app = common::build_test_app();
    let response = common::send_json_auth(
        app,
        Method::POST,
        "/api/v1/projects",
        1,
        serde_json::json!({ "name": "Apollo", "completion_pct": "abc" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_bad_request_envelope(&body_json(response).await);
}

#[tokio::test]
async fn unparseable_json_body_returns_envelope() {
    let app = common::build_test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = common::send(app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_bad_request_envelope(&body_json(response).await);
}

#[tokio::test]
async fn non_numeric_path_id_returns_envelope() {
    let app = common::build_test_app();
    let response = get_auth(app, "/api/v1/projects/abc", 1).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_bad_request_envelope(&json);
    assert!(json["message"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn mistyped_query_parameter_returns_envelope() {
    let app = common::build_test_app();
    let response = get_auth(app, "/api/v1/audit-logs?limit=many", 1).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_bad_request_envelope(&body_json(response).await);
}
