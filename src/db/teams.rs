//! Database queries for teams and users.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, ConflictKind};
use crate::models::{TeamMember, User};

/// Insert a team row. A duplicate name is a `TEAM_EXISTS` conflict.
pub async fn insert_team(
    conn: &mut SqliteConnection,
    team_id: Uuid,
    name: &str,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO teams (id, name, created_at) VALUES (?, ?, ?)")
        .bind(team_id)
        .bind(name)
        .bind(Utc::now())
        .execute(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(ConflictKind::TeamExists, "team_name already exists")
            } else {
                AppError::database_with_op(e.to_string(), "insert team")
            }
        })?;

    Ok(())
}

/// Insert a user or overwrite its name, active flag and team.
pub async fn upsert_member(
    conn: &mut SqliteConnection,
    team_id: Uuid,
    member: &TeamMember,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, is_active, team_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE
        SET name = excluded.name,
            is_active = excluded.is_active,
            team_id = excluded.team_id
        "#,
    )
    .bind(member.user_id)
    .bind(&member.username)
    .bind(member.is_active)
    .bind(team_id)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

/// Look up a team id by its unique name.
pub async fn find_team_id(conn: &mut SqliteConnection, name: &str) -> Result<Option<Uuid>, AppError> {
    let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM teams WHERE name = ?")
        .bind(name)
        .fetch_optional(conn)
        .await?;

    Ok(id)
}

/// Current members of a team, ordered by username.
pub async fn list_members(
    conn: &mut SqliteConnection,
    team_id: Uuid,
) -> Result<Vec<TeamMember>, AppError> {
    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT id AS user_id, name AS username, is_active
        FROM users
        WHERE team_id = ?
        ORDER BY name, id
        "#,
    )
    .bind(team_id)
    .fetch_all(conn)
    .await?;

    Ok(members)
}

/// Load a user with its team name resolved.
pub async fn find_user(conn: &mut SqliteConnection, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id AS user_id, u.name AS username, t.name AS team_name, u.is_active
        FROM users u
        LEFT JOIN teams t ON t.id = u.team_id
        WHERE u.id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

pub async fn user_exists(conn: &mut SqliteConnection, user_id: Uuid) -> Result<bool, AppError> {
    let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(row.is_some())
}

/// The team of a user.
///
/// The outer `Option` is `None` when the user does not exist; the inner one
/// when the user exists but belongs to no team.
pub async fn find_user_team(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> Result<Option<Option<Uuid>>, AppError> {
    let team_id: Option<Option<Uuid>> = sqlx::query_scalar("SELECT team_id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(team_id)
}

/// Set a user's active flag. Returns false when the user does not exist.
pub async fn set_active(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    is_active: bool,
) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(user_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Ids of the active members of a team, ordered by id.
///
/// The stable order keeps seeded sampling reproducible.
pub async fn active_member_ids(
    conn: &mut SqliteConnection,
    team_id: Uuid,
) -> Result<Vec<Uuid>, AppError> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM users WHERE team_id = ? AND is_active = 1 ORDER BY id",
    )
    .bind(team_id)
    .fetch_all(conn)
    .await?;

    Ok(ids)
}
