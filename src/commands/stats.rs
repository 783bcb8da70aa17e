//! Statistics handler.

use axum::extract::State;
use axum::Json;

use crate::commands::ApiErr;
use crate::models::Stats;
use crate::services::ReviewService;

/// GET /stats — pull request counts and per-reviewer load.
pub async fn get_stats(State(service): State<ReviewService>) -> Result<Json<Stats>, ApiErr> {
    let stats = service.get_stats().await?;
    Ok(Json(stats))
}
