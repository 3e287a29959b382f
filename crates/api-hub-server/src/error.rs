// crates/api-hub-server/src/error.rs
// ============================================================================
// Module: Data API Errors
// Description: JSON error responses for the `/api` routes and exports.
// Purpose: Map service failures onto stable HTTP status codes.
// Dependencies: api-hub-core, api-hub-export, axum, serde
// ============================================================================

//! ## Overview
//! [`ApiError`] is the failure type of every data API handler. It renders as
//! `{"error": kind, "message": text}`. Store failures are reduced to a short
//! label so no internal diagnostic leaves the process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use api_hub_core::ServiceError;
use api_hub_export::ExportError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Data API failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request input failed validation or did not parse.
    #[error("{0}")]
    Invalid(String),
    /// Referenced record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Request conflicts with stored state.
    #[error("{0}")]
    Conflict(String),
    /// Presented credential was not accepted.
    #[error("{0}")]
    Unauthorized(String),
    /// Request body exceeded the configured limit.
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),
    /// Unexpected failure; carries a short label only.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the stable error kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => Self::Invalid(message),
            ServiceError::NotFound(message) => Self::NotFound(message),
            ServiceError::Conflict(message) => Self::Conflict(message),
            ServiceError::Unauthorized(message) => Self::Unauthorized(message),
            ServiceError::Store(_) => Self::Internal("store unavailable".to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(_: ExportError) -> Self {
        Self::Internal("export rendering failed".to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable error kind.
    error: &'static str,
    /// Human-readable message.
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
