//! Pull request handlers and their wire shapes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::{json_body, ApiErr};
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestStatus, PullRequestSummary, Reassignment};
use crate::services::ReviewService;

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRequest {
    #[serde(default)]
    pub pull_request_id: Uuid,
    #[serde(default)]
    pub pull_request_name: String,
    #[serde(default)]
    pub author_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeRequest {
    #[serde(default)]
    pub pull_request_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReassignRequest {
    #[serde(default)]
    pub pull_request_id: Uuid,
    #[serde(default)]
    pub old_user_id: Uuid,
}

// ── Response types ───────────────────────────────────────────────────────────

/// Pull request as rendered over HTTP.
#[derive(Debug, Serialize)]
pub struct PullRequestBody {
    pub pull_request_id: Uuid,
    pub pull_request_name: String,
    pub author_id: Uuid,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<Uuid>,
    pub need_more_reviewers: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestBody {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.title,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: pr.reviewers.assigned(),
            need_more_reviewers: pr.need_more_reviewers,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestShort {
    pub pull_request_id: Uuid,
    pub pull_request_name: String,
    pub author_id: Uuid,
    pub status: PullRequestStatus,
}

impl From<PullRequestSummary> for PullRequestShort {
    fn from(summary: PullRequestSummary) -> Self {
        Self {
            pull_request_id: summary.id,
            pull_request_name: summary.title,
            author_id: summary.author_id,
            status: summary.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pub pr: PullRequestBody,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pub pr: PullRequestBody,
    pub replaced_by: Uuid,
}

impl From<Reassignment> for ReassignResponse {
    fn from(reassignment: Reassignment) -> Self {
        Self {
            pr: reassignment.pull_request.into(),
            replaced_by: reassignment.replaced_by,
        }
    }
}

fn required_pull_request(id: Uuid) -> Result<Uuid, AppError> {
    if id.is_nil() {
        return Err(AppError::invalid_input_field(
            "INVALID_PULL_REQUEST",
            "pull_request_id is required",
            "pull_request_id",
        ));
    }
    Ok(id)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /pullRequest/create — create a pull request and assign reviewers.
pub async fn create(
    State(service): State<ReviewService>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiErr> {
    let request = json_body(body)?;
    if request.pull_request_id.is_nil()
        || request.author_id.is_nil()
        || request.pull_request_name.trim().is_empty()
    {
        return Err(AppError::invalid_input("INVALID_PULL_REQUEST", "invalid pull request").into());
    }

    let pr = service
        .create_pull_request(
            request.pull_request_id,
            request.author_id,
            request.pull_request_name,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse { pr: pr.into() }),
    ))
}

/// POST /pullRequest/merge — mark a pull request merged. Idempotent.
pub async fn merge(
    State(service): State<ReviewService>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiErr> {
    let request = json_body(body)?;
    let id = required_pull_request(request.pull_request_id)?;

    let pr = service.merge_pull_request(id).await?;
    Ok(Json(PullRequestResponse { pr: pr.into() }))
}

/// POST /pullRequest/reassign — swap one reviewer for another teammate.
pub async fn reassign(
    State(service): State<ReviewService>,
    body: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiErr> {
    let request = json_body(body)?;
    let pr_id = required_pull_request(request.pull_request_id)?;
    if request.old_user_id.is_nil() {
        return Err(AppError::invalid_input_field(
            "INVALID_USER",
            "old_user_id is required",
            "old_user_id",
        )
        .into());
    }

    let reassignment = service.reassign_reviewer(pr_id, request.old_user_id).await?;
    Ok(Json(reassignment.into()))
}
