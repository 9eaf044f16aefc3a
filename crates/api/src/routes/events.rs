//! Raw event history endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::AggregateId;
use event_store::EventStore;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

/// Response type for stored event rows.
#[derive(Serialize)]
pub struct EventEntryResponse {
    pub sequence_id: i64,
    pub aggregate_id: String,
    pub event_type: String,
    pub occurred_on: String,
    pub payload: serde_json::Value,
}

/// GET /api/v1/events/{id} — list all stored events of one aggregate.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEntryResponse>>, ApiError> {
    let entries = state
        .event_store
        .load_all(&AggregateId::from(id.as_str()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if entries.is_empty() {
        return Err(ApiError::NotFound(format!("No events for aggregate {id}")));
    }

    let responses = entries
        .into_iter()
        .map(|e| {
            let payload = serde_json::from_slice(&e.payload)
                .map_err(|err| ApiError::Internal(format!("Undecodable event payload: {err}")))?;
            Ok(EventEntryResponse {
                sequence_id: e.sequence_id,
                aggregate_id: e.aggregate_id.to_string(),
                event_type: e.event_type,
                occurred_on: e.occurred_on.to_rfc3339(),
                payload,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(responses))
}
