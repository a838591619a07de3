use axum::{Json, extract::State};

use crate::{base::types::TicketStats, prelude::*, runtime::Runtime};

use super::error::ApiError;

/// `GET /tickets/stats/`
///
/// Recomputed on every call.
#[instrument(skip_all)]
pub async fn get_ticket_stats(State(runtime): State<Runtime>) -> Result<Json<TicketStats>, ApiError> {
    let stats = runtime.db.get_ticket_stats().await?;

    Ok(Json(stats))
}
