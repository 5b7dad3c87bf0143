use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lsr_db::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Store(e) => {
                // Details stay in the logs
                tracing::error!("Store failure: {e}");
                "Storage is unavailable, please retry".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
