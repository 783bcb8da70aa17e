//! Swapping one reviewer of an open pull request for another teammate.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::{pull_requests, teams};
use crate::error::{AppError, ConflictKind};
use crate::models::Reassignment;
use crate::services::assignment::{pick_replacement, ReviewerSampler};

/// Which users are kept out of the replacement pool.
///
/// The outgoing reviewer and the author are always excluded. Excluding the
/// author goes beyond a plain old-reviewer-only pool: without it a team
/// whose only other member is the author would hand them their own review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReassignPolicy {
    /// The other assigned reviewer stays eligible, so the replacement may
    /// end up holding both slots.
    #[default]
    AllowDuplicate,
    /// Every currently assigned reviewer is excluded.
    ExcludeAssigned,
}

pub async fn reassign_reviewer(
    conn: &mut SqliteConnection,
    sampler: &dyn ReviewerSampler,
    policy: ReassignPolicy,
    pr_id: Uuid,
    old_user_id: Uuid,
) -> Result<Reassignment, AppError> {
    let pull_request = pull_requests::find(conn, pr_id)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("pull request", pr_id.to_string()))?;

    if !teams::user_exists(conn, old_user_id).await? {
        return Err(AppError::not_found_with_id("user", old_user_id.to_string()));
    }

    if pull_request.is_merged() {
        return Err(AppError::conflict(
            ConflictKind::PullRequestMerged,
            "cannot reassign on merged PR",
        ));
    }

    let team_id = match teams::find_user_team(conn, pull_request.author_id).await? {
        Some(Some(team_id)) => team_id,
        Some(None) => return Err(AppError::not_found("author has no team")),
        None => {
            return Err(AppError::not_found_with_id(
                "author",
                pull_request.author_id.to_string(),
            ))
        }
    };

    let mut excluded = vec![old_user_id, pull_request.author_id];
    if policy == ReassignPolicy::ExcludeAssigned {
        excluded.extend(pull_request.reviewers.assigned());
    }

    let candidates = teams::active_member_ids(conn, team_id).await?;
    let replacement = pick_replacement(&candidates, &excluded, sampler)
        .ok_or_else(|| AppError::no_candidate("no active replacement candidate in team"))?;

    let position = pull_request
        .reviewers
        .position_of(old_user_id)
        .ok_or_else(|| AppError::not_assigned("reviewer is not assigned to this PR"))?;

    let updated =
        pull_requests::replace_reviewer(conn, pr_id, position, old_user_id, replacement)
            .await?
            .ok_or_else(|| AppError::not_assigned("reviewer is not assigned to this PR"))?;

    log::info!(
        "[reassignment] Pull request {}: {} replaced by {} in {}",
        pr_id,
        old_user_id,
        replacement,
        position.column()
    );

    Ok(Reassignment {
        pull_request: updated,
        replaced_by: replacement,
    })
}
