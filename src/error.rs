// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/* ============================================================
   Proxy-facing errors
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str, String),
    BadGateway(&'static str, String),
    Internal(String),
}

impl ApiError {
    /// Required upstream configuration (URL or credential) is absent.
    /// Fail closed: never forward an unauthenticated request.
    pub fn upstream_not_configured() -> Self {
        ApiError::BadGateway(
            "UPSTREAM_NOT_CONFIGURED",
            "Upstream API credentials are not configured".into(),
        )
    }

    pub fn upstream_unreachable(detail: String) -> Self {
        ApiError::BadGateway("UPSTREAM_UNREACHABLE", detail)
    }

    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::BadGateway(code, msg) => {
                (StatusCode::BAD_GATEWAY, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::to_error_response("INTERNAL", &msg),
            )
                .into_response(),
        }
    }
}

/* ============================================================
   API client errors
   ============================================================ */

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("invalid record: {0}")]
    Record(#[from] crate::models::RecordError),
}

/* ============================================================
   Local store errors
   ============================================================ */

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("transition from `{from}` to `{to}` is not allowed")]
    IllegalTransition { from: String, to: String },
    #[error("appointment {0} not found")]
    NotFound(i64),
}
