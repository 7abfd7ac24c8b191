//! API Error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mimic_core::error::PortalError;
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Portal(#[from] PortalError),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Portal(e) => {
                let status = match e {
                    PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
                    PortalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    PortalError::InvalidState(_) | PortalError::InvalidTransition { .. } => {
                        StatusCode::CONFLICT
                    }
                    PortalError::PolicyViolation(_) | PortalError::Forbidden(_) => {
                        StatusCode::FORBIDDEN
                    }
                    PortalError::Storage(_) | PortalError::Serialization(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.code(), e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PortalError::not_found("Request", "x"), StatusCode::NOT_FOUND),
            (PortalError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (PortalError::invalid_state("x"), StatusCode::CONFLICT),
            (
                PortalError::InvalidTransition {
                    entity: "Ticket".into(),
                    id: "t".into(),
                    from: "closed".into(),
                    to: "open".into(),
                },
                StatusCode::CONFLICT,
            ),
            (PortalError::PolicyViolation("x".into()), StatusCode::FORBIDDEN),
            (PortalError::forbidden("x"), StatusCode::FORBIDDEN),
            (PortalError::storage("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (PortalError::Serialization("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
