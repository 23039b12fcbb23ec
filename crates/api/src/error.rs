//! HTTP mapping of domain errors
//!
//! Every failed API call answers `{"error": {"code", "message"}}`. Server
//! side failures keep their detail in the logs and send a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use influlink_domain::InfluLinkError;
use serde_json::json;
use tracing::{error, warn};

use crate::utils::logging::error_label;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "a valid bearer token is required")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<InfluLinkError> for ApiError {
    fn from(err: InfluLinkError) -> Self {
        let (status, code) = match &err {
            InfluLinkError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            InfluLinkError::Decode(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            InfluLinkError::Auth(_) => (StatusCode::UNAUTHORIZED, "AUTH_FAILED"),
            InfluLinkError::Security(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            InfluLinkError::EntityNotFound(_) | InfluLinkError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            InfluLinkError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            InfluLinkError::MergeConflict(_) => (StatusCode::CONFLICT, "MERGE_CONFLICT"),
            InfluLinkError::ProviderNotConfigured(_) => {
                (StatusCode::NOT_IMPLEMENTED, "PROVIDER_NOT_CONFIGURED")
            }
            InfluLinkError::ProfileFetch(_) | InfluLinkError::Network(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED")
            }
            InfluLinkError::Database(_) | InfluLinkError::Config(_) | InfluLinkError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        };

        let message = if status.is_server_error() {
            error!(error = %err, kind = error_label(&err), "request failed");
            "internal error".to_string()
        } else {
            warn!(error = %err, kind = error_label(&err), "request rejected");
            err.to_string()
        };

        Self { status, code, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
