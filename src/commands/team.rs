//! Team handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::commands::{json_body, ApiErr};
use crate::error::AppError;
use crate::models::Team;
use crate::services::ReviewService;

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: Option<String>,
}

fn validate_team(team: &Team) -> Result<(), AppError> {
    if team.name.trim().is_empty() || team.members.is_empty() {
        return Err(AppError::invalid_input(
            "INVALID_TEAM",
            "team name or members are invalid",
        ));
    }

    if team
        .members
        .iter()
        .any(|m| m.user_id.is_nil() || m.username.trim().is_empty())
    {
        return Err(AppError::invalid_input_field(
            "INVALID_TEAM",
            "every member needs a user_id and a username",
            "members",
        ));
    }

    Ok(())
}

/// POST /team/add — create a team and upsert its members.
pub async fn add_team(
    State(service): State<ReviewService>,
    body: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let team = json_body(body)?;
    validate_team(&team)?;

    service.upsert_team(team.clone()).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=X — a team with its members.
pub async fn get_team(
    State(service): State<ReviewService>,
    Query(params): Query<TeamQuery>,
) -> Result<Json<TeamResponse>, ApiErr> {
    let team_name = params
        .team_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            AppError::invalid_input_field(
                "INVALID_PARAMETER",
                "team_name query parameter is required",
                "team_name",
            )
        })?;

    let team = service.get_team(team_name).await?;
    Ok(Json(TeamResponse { team }))
}
