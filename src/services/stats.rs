//! Read-only projections over pull requests.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::{pull_requests, teams};
use crate::error::AppError;
use crate::models::{PullRequestSummary, Stats};

pub async fn get_stats(conn: &mut SqliteConnection) -> Result<Stats, AppError> {
    let (total_pr, open_pr, merged_pr) = pull_requests::status_counts(conn).await?;
    let review_assignments = pull_requests::review_counts(conn).await?;

    Ok(Stats {
        total_pr,
        open_pr,
        merged_pr,
        review_assignments,
    })
}

/// Pull requests on which `user_id` holds a reviewer slot.
pub async fn get_reviews_for_user(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> Result<Vec<PullRequestSummary>, AppError> {
    if !teams::user_exists(conn, user_id).await? {
        return Err(AppError::not_found_with_id("user", user_id.to_string()));
    }

    pull_requests::list_for_reviewer(conn, user_id).await
}
