//! Ticket listing, creation, and update handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    base::types::{Ticket, TicketFilter},
    prelude::*,
    runtime::Runtime,
};

use super::{
    error::ApiError,
    validation::{validate_new_ticket, validate_ticket_patch},
};

/// `GET /tickets/`
#[instrument(skip_all)]
pub async fn list_tickets(State(runtime): State<Runtime>, Query(filter): Query<TicketFilter>) -> Result<Json<Vec<Ticket>>, ApiError> {
    let filter = filter.normalized();
    debug!("Listing tickets with {filter:?}");

    let tickets = runtime.db.list_tickets(&filter).await?;

    Ok(Json(tickets))
}

/// `POST /tickets/`
#[instrument(skip_all)]
pub async fn create_ticket(State(runtime): State<Runtime>, body: Result<Json<Value>, JsonRejection>) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let Json(body) = body?;
    let ticket = validate_new_ticket(&body).map_err(ApiError::Validation)?;

    let created = runtime.db.create_ticket(&ticket, Utc::now()).await?;
    info!("Created ticket `{}`.", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /tickets/{id}/`
#[instrument(skip_all, fields(id = %id))]
pub async fn patch_ticket(State(runtime): State<Runtime>, Path(id): Path<String>, body: Result<Json<Value>, JsonRejection>) -> Result<Json<Ticket>, ApiError> {
    update_ticket(&runtime, &id, body, false).await
}

/// `PUT /tickets/{id}/`
#[instrument(skip_all, fields(id = %id))]
pub async fn put_ticket(State(runtime): State<Runtime>, Path(id): Path<String>, body: Result<Json<Value>, JsonRejection>) -> Result<Json<Ticket>, ApiError> {
    update_ticket(&runtime, &id, body, true).await
}

async fn update_ticket(runtime: &Runtime, id: &str, body: Result<Json<Value>, JsonRejection>, full: bool) -> Result<Json<Ticket>, ApiError> {
    // Only integer IDs can address a ticket.
    let id = id.parse::<i64>().map_err(|_| ApiError::NotFound)?;

    // A missing ticket is reported before anything about the payload.
    if runtime.db.get_ticket(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let Json(body) = body?;
    let patch = validate_ticket_patch(&body, full).map_err(ApiError::Validation)?;

    let updated = runtime.db.update_ticket(id, &patch).await?.ok_or(ApiError::NotFound)?;
    info!("Updated ticket `{id}`.");

    Ok(Json(updated))
}
