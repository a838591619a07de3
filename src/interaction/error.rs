//! HTTP error responses.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Validation messages keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Every way a request can fail, mapped onto a status code and JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more payload fields are missing or malformed (400).
    #[error("invalid fields: {0:?}")]
    Validation(FieldErrors),
    /// The request itself is unusable (400).
    #[error("{0}")]
    BadRequest(String),
    /// The addressed ticket does not exist (404).
    #[error("Not found.")]
    NotFound,
    /// An external dependency failed; the message is surfaced to the caller (500).
    #[error("{0:#}")]
    Downstream(anyhow::Error),
    /// Anything else; logged, but not surfaced (500).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, Json(json!(errors))).into_response(),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
            Self::Downstream(err) => {
                error!("Downstream failure: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": format!("{err:#}") }))).into_response()
            }
            Self::Internal(err) => {
                error!("Internal failure: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal server error." }))).into_response()
            }
        }
    }
}
