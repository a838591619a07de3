//! LLM-backed classification handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;

use crate::{base::types::Suggestion, prelude::*, runtime::Runtime};

use super::error::ApiError;

/// `POST /tickets/classify/`
///
/// The suggestion is advisory; nothing is persisted.
#[instrument(skip_all)]
pub async fn classify_ticket(State(runtime): State<Runtime>, body: Result<Json<Value>, JsonRejection>) -> Result<Json<Suggestion>, ApiError> {
    let Json(body) = body?;

    let description = match body.get("description") {
        Some(Value::String(description)) if !description.trim().is_empty() => description,
        _ => return Err(ApiError::BadRequest("Description is required".to_string())),
    };

    let suggestion = runtime.classifier.classify(description).await.map_err(ApiError::Downstream)?;

    Ok(Json(suggestion))
}
