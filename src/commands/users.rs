//! User handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::pull_request::PullRequestShort;
use crate::commands::{json_body, ApiErr};
use crate::error::AppError;
use crate::models::User;
use crate::services::ReviewService;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetIsActiveRequest {
    #[serde(default)]
    pub user_id: Uuid,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub user_id: Uuid,
    pub pull_requests: Vec<PullRequestShort>,
}

/// POST /users/setIsActive — toggle a user's active flag.
pub async fn set_is_active(
    State(service): State<ReviewService>,
    body: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let request = json_body(body)?;
    if request.user_id.is_nil() {
        return Err(
            AppError::invalid_input_field("INVALID_USER", "user_id is required", "user_id").into(),
        );
    }

    let user = service
        .set_user_active(request.user_id, request.is_active)
        .await?;

    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=X — pull requests the user reviews.
pub async fn get_review(
    State(service): State<ReviewService>,
    Query(params): Query<ReviewQuery>,
) -> Result<Json<ReviewResponse>, ApiErr> {
    let raw = params
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            AppError::invalid_input_field("INVALID_USER", "user_id is required", "user_id")
        })?;

    let user_id = Uuid::parse_str(&raw).map_err(|_| {
        AppError::invalid_input_field("INVALID_USER", "invalid user_id format", "user_id")
    })?;

    let reviews = service.get_reviews_for_user(user_id).await?;

    Ok(Json(ReviewResponse {
        user_id,
        pull_requests: reviews.into_iter().map(PullRequestShort::from).collect(),
    }))
}
