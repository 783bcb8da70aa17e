//! Pull request lifecycle: creation with reviewer assignment, and merge.
//!
//! Both functions expect to run inside a single transaction scope
//! (see [`crate::db::Store::with_transaction`]).

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::{pull_requests, teams};
use crate::error::AppError;
use crate::models::PullRequest;
use crate::services::assignment::{assign_reviewers, ReviewerSampler};

/// Create an OPEN pull request and assign up to two reviewers from the
/// author's team.
pub async fn create_pull_request(
    conn: &mut SqliteConnection,
    sampler: &dyn ReviewerSampler,
    id: Uuid,
    author_id: Uuid,
    title: &str,
) -> Result<PullRequest, AppError> {
    let team_id = match teams::find_user_team(conn, author_id).await? {
        Some(Some(team_id)) => team_id,
        Some(None) => return Err(AppError::not_found("author has no team")),
        None => return Err(AppError::not_found_with_id("author", author_id.to_string())),
    };

    pull_requests::insert(conn, id, title, author_id, Utc::now()).await?;

    let candidates = teams::active_member_ids(conn, team_id).await?;
    let assignment = assign_reviewers(&candidates, author_id, sampler);

    pull_requests::set_reviewers(
        conn,
        id,
        assignment.reviewers,
        assignment.need_more_reviewers,
    )
    .await?;

    log::info!(
        "[lifecycle] Created pull request {} with {} reviewer(s)",
        id,
        assignment.reviewers.filled()
    );

    pull_requests::find(conn, id)
        .await?
        .ok_or_else(|| AppError::internal(format!("pull request {} missing after insert", id)))
}

/// Mark a pull request merged. Merging an already merged pull request
/// returns it unchanged.
pub async fn merge_pull_request(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<PullRequest, AppError> {
    if let Some(merged) = pull_requests::merge_if_open(conn, id, Utc::now()).await? {
        log::info!("[lifecycle] Merged pull request {}", id);
        return Ok(merged);
    }

    match pull_requests::find(conn, id).await? {
        Some(existing) => {
            log::debug!("[lifecycle] Pull request {} already merged", id);
            Ok(existing)
        }
        None => Err(AppError::not_found_with_id("pull request", id.to_string())),
    }
}
