use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inference::InferenceError;
use protocol::api::ErrorResponse;
use thiserror::Error;

pub(crate) const SESSION_NOT_FOUND: &str = "Session not found. Please upload a ZAP scan first.";

/// Failures surfaced to HTTP clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{0}")]
    MalformedInput(String),
    #[error("no report file was uploaded")]
    MissingFile,
    #[error("upload exceeds the {limit} bytes limit")]
    PayloadTooLarge { limit: usize },
    #[error("{}", SESSION_NOT_FOUND)]
    SessionNotFound,
    #[error("inference service failure: {0}")]
    Inference(#[from] InferenceError),
}

impl ServiceError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            ServiceError::MalformedInput(_) | ServiceError::MissingFile => StatusCode::BAD_REQUEST,
            ServiceError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::SessionNotFound => StatusCode::NOT_FOUND,
            ServiceError::Inference(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
