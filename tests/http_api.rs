//! HTTP API tests.
//!
//! Requests go through the full router (including the logging middleware)
//! with `tower::ServiceExt::oneshot`, so no socket is opened.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use review_assign::db::{self, Store};
use review_assign::server;
use review_assign::services::{ReviewService, SeededSampler};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("review.db")).await.unwrap();
    let service = ReviewService::new(Store::new(pool)).with_sampler(Arc::new(SeededSampler::new(3)));
    (dir, server::app(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body.to_string())).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_full_review_flow() {
    let (_dir, app) = setup().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let carol = Uuid::new_v4();

    let team = json!({
        "team_name": "backend",
        "members": [
            {"user_id": alice, "username": "alice", "is_active": true},
            {"user_id": bob, "username": "bob", "is_active": true},
            {"user_id": carol, "username": "carol", "is_active": true}
        ]
    });

    let (status, body) = post(&app, "/team/add", team.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "backend");
    assert_eq!(body["team"]["members"].as_array().unwrap().len(), 3);

    let (status, body) = post(&app, "/team/add", team).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "TEAM_EXISTS");

    let (status, body) = get(&app, "/team/get?team_name=backend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team"]["members"][0]["username"], "alice");

    let pr_id = Uuid::new_v4();
    let create = json!({
        "pull_request_id": pr_id,
        "pull_request_name": "Add search",
        "author_id": alice
    });
    let (status, body) = post(&app, "/pullRequest/create", create.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["pull_request_id"], json!(pr_id));
    assert_eq!(body["pr"]["status"], "OPEN");
    assert_eq!(body["pr"]["need_more_reviewers"], false);
    assert!(body["pr"]["createdAt"].is_string());
    assert!(body["pr"].get("mergedAt").is_none());
    let reviewers = body["pr"]["assigned_reviewers"].as_array().unwrap().clone();
    assert_eq!(reviewers.len(), 2);
    assert!(!reviewers.contains(&json!(alice)));

    let (status, body) = post(&app, "/pullRequest/create", create).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_EXISTS");

    let (status, body) = get(&app, &format!("/users/getReview?user_id={}", bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], json!(bob));
    assert_eq!(body["pull_requests"][0]["pull_request_id"], json!(pr_id));
    assert_eq!(body["pull_requests"][0]["status"], "OPEN");

    // alice is the author, so replacing bob can only yield carol
    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": pr_id, "old_user_id": bob}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], json!(carol));

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": pr_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["mergedAt"].clone();
    assert!(merged_at.is_string());

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": pr_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["mergedAt"], merged_at);

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": pr_id, "old_user_id": carol}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_MERGED");

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pr"], 1);
    assert_eq!(body["open_pr"], 0);
    assert_eq!(body["merged_pr"], 1);
    assert_eq!(body["review_assignments"]["carol"], 2);
    assert!(body["review_assignments"].get("bob").is_none());
}

#[tokio::test]
async fn test_malformed_bodies_are_invalid_json() {
    let (_dir, app) = setup().await;

    let (status, body) = send(&app, "POST", "/team/add", Some("{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_JSON");

    let (status, body) = post(
        &app,
        "/pullRequest/merge",
        json!({"pull_request_id": Uuid::new_v4(), "force": true}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_JSON");
}

#[tokio::test]
async fn test_shape_validation_codes() {
    let (_dir, app) = setup().await;

    let (status, body) = post(&app, "/team/add", json!({"team_name": "", "members": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_TEAM");

    let (status, body) = get(&app, "/team/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_PARAMETER");

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": Uuid::new_v4(), "pull_request_name": "", "author_id": Uuid::new_v4()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_PULL_REQUEST");

    let (status, body) = post(&app, "/pullRequest/merge", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_PULL_REQUEST");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": Uuid::new_v4()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_USER");

    let (status, body) = get(&app, "/users/getReview?user_id=not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_USER");

    let (status, body) = post(&app, "/users/setIsActive", json!({"is_active": true})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_USER");
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let (_dir, app) = setup().await;

    let (status, body) = get(&app, "/team/get?team_name=ghosts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": Uuid::new_v4(), "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": Uuid::new_v4(), "pull_request_name": "x", "author_id": Uuid::new_v4()}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = get(&app, &format!("/users/getReview?user_id={}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_set_is_active_returns_user() {
    let (_dir, app) = setup().await;
    let dana = Uuid::new_v4();

    let (status, _) = post(
        &app,
        "/team/add",
        json!({"team_name": "ops", "members": [{"user_id": dana, "username": "dana", "is_active": true}]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &app,
        "/users/setIsActive",
        json!({"user_id": dana, "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["user"],
        json!({"user_id": dana, "username": "dana", "team_name": "ops", "is_active": false})
    );
}
