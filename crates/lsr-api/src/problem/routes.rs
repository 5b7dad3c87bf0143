use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;

use lsr_srs::{Difficulty, SolvedEvent};

use crate::{error::ApiError, state::ApiState};

/// Create the problem routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/problems", get(get_all_problems).delete(clear_all_problems))
        .route("/problems/solved", post(problem_solved))
        .route("/problems/reschedule", post(reschedule_all))
        .route("/problems/export", get(export_problems))
        .route("/problems/{key}", delete(delete_problem))
        .route("/problems/{key}/review", post(confirm_review))
        .route("/problems/{key}/plan", get(get_review_plan))
        .route("/reviews/due", get(get_due_reviews))
}

#[derive(Debug, Deserialize)]
struct ProblemFilter {
    difficulty: Option<String>,
}

/// Merge a solved event into the tracked problems
async fn problem_solved(
    State(state): State<ApiState>,
    Json(event): Json<SolvedEvent>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.tracker.record_solved(event).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

/// Confirm a review without solving the problem again
async fn confirm_review(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let success = state.tracker.confirm_review(&key).await?;
    Ok(Json(json!({ "success": success })))
}

/// Delete a problem by key or url
async fn delete_problem(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let success = state.tracker.delete(&key).await?;
    Ok(Json(json!({ "success": success })))
}

/// Delete every problem
async fn clear_all_problems(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let success = state.tracker.clear_all().await?;
    Ok(Json(json!({ "success": success })))
}

/// Get problems due for review
async fn get_due_reviews(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.tracker.due_reviews().await?))
}

/// Get all problems, soonest review first
async fn get_all_problems(
    State(state): State<ApiState>,
    Query(filter): Query<ProblemFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let difficulty = filter
        .difficulty
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(Difficulty::parse);

    Ok(Json(state.tracker.all_problems(difficulty).await?))
}

async fn get_review_plan(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = state
        .tracker
        .review_plan(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound("No study window is set".to_string()))?;

    Ok(Json(plan))
}

/// Recompute every review date under the current settings
async fn reschedule_all(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let updated = state.tracker.reschedule_all().await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}

async fn export_problems(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.tracker.export().await?))
}
