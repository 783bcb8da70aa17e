//! HTTP handlers for the review service.
//!
//! Each handler validates the request shape, calls one [`ReviewService`]
//! operation and renders the result. Handlers are organized by resource:
//! - `team`: team creation and lookup
//! - `users`: active flag and review lists
//! - `pull_request`: create, merge, reassign
//! - `stats`: assignment statistics

pub mod pull_request;
pub mod stats;
pub mod team;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{AppError, ConflictKind};
use crate::services::ReviewService;

/// Build the API router around a service handle.
pub fn router(service: ReviewService) -> Router {
    Router::new()
        .route("/team/add", post(team::add_team))
        .route("/team/get", get(team::get_team))
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/pullRequest/create", post(pull_request::create))
        .route("/pullRequest/merge", post(pull_request::merge))
        .route("/pullRequest/reassign", post(pull_request::reassign))
        .route("/stats", get(stats::get_stats))
        .with_state(service)
}

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Wrapper to make AppError usable as an axum error response.
#[derive(Debug)]
pub struct ApiErr(pub AppError);

impl ApiErr {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { kind, .. } => match kind {
                ConflictKind::TeamExists => StatusCode::BAD_REQUEST,
                _ => StatusCode::CONFLICT,
            },
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::NoCandidate { .. } | AppError::NotAssigned { .. } => StatusCode::CONFLICT,
            AppError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AppError::InvalidInput { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::NoCandidate { message }
            | AppError::NotAssigned { message } => message.clone(),
            AppError::NotFound { .. } | AppError::Timeout { .. } => self.0.to_string(),
            AppError::Database { .. } | AppError::Internal { .. } => {
                log::error!("[http] {}", self.0);
                "internal server error".to_string()
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody {
                    code: self.0.code(),
                    message,
                },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Unwrap a JSON body, turning any rejection into `INVALID_JSON`.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiErr> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            log::warn!("[http] cannot decode request body: {}", rejection.body_text());
            Err(ApiErr(AppError::invalid_input(
                "INVALID_JSON",
                "cannot decode request body",
            )))
        }
    }
}
