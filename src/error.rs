use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request to origin failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Request has no Host header and no absolute URI")]
    MissingHost,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid agent pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid header value")]
    InvalidHeader,

    #[error("Telemetry collector rejected event: {0}")]
    Telemetry(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Upstream(e) => (
                StatusCode::BAD_GATEWAY,
                format!("Origin request failed: {}", e),
            ),
            AppError::MissingHost => (
                StatusCode::BAD_REQUEST,
                "Missing Host header".to_string(),
            ),
            AppError::InvalidUrl(e) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid request URL: {}", e),
            ),
            AppError::InvalidHeader => (
                StatusCode::BAD_GATEWAY,
                "Invalid header value from origin".to_string(),
            ),
            AppError::InvalidPattern(_) | AppError::Telemetry(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": format!("{:?}", self),
            }
        }));

        (status, body).into_response()
    }
}
