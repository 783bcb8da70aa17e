//! Team and user directory.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::db::teams;
use crate::error::AppError;
use crate::models::{Team, User};

/// Create `team` and upsert each member into it.
///
/// Members that already exist are moved into the new team and take the
/// given name and active flag.
pub async fn upsert_team(conn: &mut SqliteConnection, team: &Team) -> Result<(), AppError> {
    let team_id = Uuid::new_v4();
    teams::insert_team(conn, team_id, &team.name).await?;

    for member in &team.members {
        teams::upsert_member(conn, team_id, member).await?;
    }

    log::info!(
        "[directory] Created team {} with {} member(s)",
        team.name,
        team.members.len()
    );
    Ok(())
}

pub async fn get_team(conn: &mut SqliteConnection, name: &str) -> Result<Team, AppError> {
    let team_id = teams::find_team_id(conn, name)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("team", name))?;

    let members = teams::list_members(conn, team_id).await?;

    Ok(Team {
        name: name.to_string(),
        members,
    })
}

/// Toggle a user's active flag. Existing assignments are left alone.
pub async fn set_user_active(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    is_active: bool,
) -> Result<User, AppError> {
    if !teams::set_active(conn, user_id, is_active).await? {
        return Err(AppError::not_found_with_id("user", user_id.to_string()));
    }

    log::info!("[directory] User {} is_active={}", user_id, is_active);

    teams::find_user(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found_with_id("user", user_id.to_string()))
}
