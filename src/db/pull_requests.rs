//! Database queries for pull requests.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, ConflictKind};
use crate::models::{PullRequest, PullRequestSummary, ReviewerSlots, SlotPosition};

const PR_COLUMNS: &str = "id, title, author_id, status, reviewer1_id, reviewer2_id, \
                          need_more_reviewers, created_at, merged_at";

/// Raw `pull_request` row; `status` is parsed on conversion.
#[derive(Debug, FromRow)]
struct PullRequestRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    status: String,
    reviewer1_id: Option<Uuid>,
    reviewer2_id: Option<Uuid>,
    need_more_reviewers: bool,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = AppError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            author_id: row.author_id,
            status: row.status.parse()?,
            reviewers: ReviewerSlots {
                reviewer1: row.reviewer1_id,
                reviewer2: row.reviewer2_id,
            },
            need_more_reviewers: row.need_more_reviewers,
            created_at: row.created_at,
            merged_at: row.merged_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    status: String,
}

impl TryFrom<SummaryRow> for PullRequestSummary {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            author_id: row.author_id,
            status: row.status.parse()?,
        })
    }
}

fn into_pull_request(row: Option<PullRequestRow>) -> Result<Option<PullRequest>, AppError> {
    row.map(PullRequest::try_from).transpose()
}

/// Insert an OPEN pull request with empty slots. A duplicate id is a
/// `PR_EXISTS` conflict.
pub async fn insert(
    conn: &mut SqliteConnection,
    id: Uuid,
    title: &str,
    author_id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO pull_request (id, title, author_id, status, need_more_reviewers, created_at)
        VALUES (?, ?, ?, 'OPEN', 0, ?)
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(author_id)
    .bind(created_at)
    .execute(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict(ConflictKind::PullRequestExists, "PR id already exists")
        } else {
            AppError::database_with_op(e.to_string(), "insert pull request")
        }
    })?;

    Ok(())
}

/// Persist the assignment made at creation time.
pub async fn set_reviewers(
    conn: &mut SqliteConnection,
    id: Uuid,
    reviewers: ReviewerSlots,
    need_more_reviewers: bool,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE pull_request
        SET reviewer1_id = ?,
            reviewer2_id = ?,
            need_more_reviewers = ?
        WHERE id = ?
        "#,
    )
    .bind(reviewers.reviewer1)
    .bind(reviewers.reviewer2)
    .bind(need_more_reviewers)
    .bind(id)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn find(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<PullRequest>, AppError> {
    let row: Option<PullRequestRow> =
        sqlx::query_as(&format!("SELECT {} FROM pull_request WHERE id = ?", PR_COLUMNS))
            .bind(id)
            .fetch_optional(conn)
            .await?;

    into_pull_request(row)
}

/// Transition OPEN → MERGED and stamp `merged_at`.
///
/// Returns `None` when no OPEN pull request with this id exists, so a second
/// merge never rewrites the timestamp.
pub async fn merge_if_open(
    conn: &mut SqliteConnection,
    id: Uuid,
    merged_at: DateTime<Utc>,
) -> Result<Option<PullRequest>, AppError> {
    let row: Option<PullRequestRow> = sqlx::query_as(&format!(
        r#"
        UPDATE pull_request
        SET status = 'MERGED',
            merged_at = ?
        WHERE id = ? AND status = 'OPEN'
        RETURNING {}
        "#,
        PR_COLUMNS
    ))
    .bind(merged_at)
    .bind(id)
    .fetch_optional(conn)
    .await?;

    into_pull_request(row)
}

/// Replace `old` with `new` in the slot at `position`.
///
/// The update only applies while the slot still holds `old` and the pull
/// request is still OPEN; otherwise `None` is returned and nothing changes.
pub async fn replace_reviewer(
    conn: &mut SqliteConnection,
    id: Uuid,
    position: SlotPosition,
    old: Uuid,
    new: Uuid,
) -> Result<Option<PullRequest>, AppError> {
    let column = position.column();
    let row: Option<PullRequestRow> = sqlx::query_as(&format!(
        r#"
        UPDATE pull_request
        SET {column} = ?
        WHERE id = ? AND {column} = ? AND status = 'OPEN'
        RETURNING {columns}
        "#,
        column = column,
        columns = PR_COLUMNS
    ))
    .bind(new)
    .bind(id)
    .bind(old)
    .fetch_optional(conn)
    .await?;

    into_pull_request(row)
}

/// Pull requests where `user_id` holds either reviewer slot, oldest first.
pub async fn list_for_reviewer(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> Result<Vec<PullRequestSummary>, AppError> {
    let rows: Vec<SummaryRow> = sqlx::query_as(
        r#"
        SELECT id, title, author_id, status
        FROM pull_request
        WHERE reviewer1_id = ?1 OR reviewer2_id = ?1
        ORDER BY created_at, id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(PullRequestSummary::try_from).collect()
}

/// `(total, open, merged)` pull request counts.
pub async fn status_counts(conn: &mut SqliteConnection) -> Result<(i64, i64, i64), AppError> {
    let counts: (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN status = 'OPEN' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'MERGED' THEN 1 ELSE 0 END), 0)
        FROM pull_request
        "#,
    )
    .fetch_one(conn)
    .await?;

    Ok(counts)
}

/// Username → number of reviewer slots held, counting both slot columns.
pub async fn review_counts(conn: &mut SqliteConnection) -> Result<HashMap<String, i64>, AppError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT u.name, COUNT(*) AS total_reviews
        FROM (
            SELECT reviewer1_id AS reviewer_id FROM pull_request WHERE reviewer1_id IS NOT NULL
            UNION ALL
            SELECT reviewer2_id AS reviewer_id FROM pull_request WHERE reviewer2_id IS NOT NULL
        ) sub
        JOIN users u ON u.id = sub.reviewer_id
        GROUP BY u.name
        "#,
    )
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().collect())
}
