use axum::{extract::multipart::MultipartError, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StashError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl StashError {
    fn status(&self) -> StatusCode {
        match self {
            StashError::Validation(_) | StashError::Multipart(_) => StatusCode::BAD_REQUEST,
            StashError::NotFound(_) => StatusCode::NOT_FOUND,
            StashError::Storage(_)
            | StashError::Database(_)
            | StashError::Migrate(_)
            | StashError::IO(_)
            | StashError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StashError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
