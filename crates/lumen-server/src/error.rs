//! Maps domain errors to HTTP responses with JSON error bodies.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use lumen_core::error::LumenError;
use lumen_stream::unsatisfied_content_range;
use thiserror::Error;

/// Error returned by every handler.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Lumen(#[from] LumenError),

    /// Missing or wrong credentials.
    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Lumen(e) => match e {
                LumenError::NotFound { .. } => StatusCode::NOT_FOUND,
                LumenError::RangeUnsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
                LumenError::AlreadyExists { .. } => StatusCode::CONFLICT,
                e if e.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(err = %self, "request failed");
        } else {
            tracing::warn!(err = %self, status = status.as_u16(), "request rejected");
        }

        match self {
            AppError::Lumen(LumenError::RangeUnsatisfiable { size }) => {
                let mut response = status.into_response();
                if let Ok(value) = HeaderValue::from_str(&unsatisfied_content_range(size)) {
                    response.headers_mut().insert(header::CONTENT_RANGE, value);
                }
                response
            }
            AppError::Unauthorized => {
                let body = error_body(status, "authentication required");
                let mut response = (status, axum::Json(body)).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(r#"Basic realm="Lumen""#),
                );
                response
            }
            other => {
                let message = match &other {
                    AppError::Lumen(LumenError::Io(_)) | AppError::Internal(_) => {
                        "internal server error".to_string()
                    }
                    _ => other.to_string(),
                };
                (status, axum::Json(error_body(status, &message))).into_response()
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
        }
    })
}
