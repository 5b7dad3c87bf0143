use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{error::ApiError, state::ApiState, tracker::StudyWindowUpdate};

/// Create the settings routes
pub fn routes() -> Router<ApiState> {
    Router::new().route(
        "/settings/study-window",
        get(get_study_window)
            .put(set_study_window)
            .delete(clear_study_window),
    )
}

async fn get_study_window(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.tracker.study_window_status().await?))
}

/// Set the study window; every review date is recomputed under it
async fn set_study_window(
    State(state): State<ApiState>,
    Json(update): Json<StudyWindowUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.tracker.set_study_window(update).await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}

/// Go back to ladder scheduling
async fn clear_study_window(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let updated = state.tracker.clear_study_window().await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}
