//! Machine endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{Aggregate, Machine};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateMachineRequest {
    pub brand: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadCoffeeRequest {
    pub coffee_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct MachineResponse {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub coffee_id: Option<String>,
}

impl From<&Machine> for MachineResponse {
    fn from(machine: &Machine) -> Self {
        Self {
            id: machine.id().map(|id| id.to_string()).unwrap_or_default(),
            brand: machine.brand().to_string(),
            model: machine.model().to_string(),
            coffee_id: machine.loaded_coffee().map(|id| id.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct CurrentCoffeeResponse {
    pub machine_id: String,
    pub coffee_id: String,
}

// -- Handlers --

/// POST /api/v1/machines — install a machine.
#[tracing::instrument(skip(state))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateMachineRequest>,
) -> Result<(StatusCode, Json<MachineResponse>), ApiError> {
    let machine = state.machines.create(&req.brand, &req.model).await?;
    Ok((StatusCode::CREATED, Json(MachineResponse::from(&machine))))
}

/// GET /api/v1/machines — list all machines.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<MachineResponse>>, ApiError> {
    let machines = state.machines.list_all().await?;
    Ok(Json(machines.iter().map(MachineResponse::from).collect()))
}

/// GET /api/v1/machines/{id} — load one machine.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<MachineResponse>, ApiError> {
    let machine = state.machines.find(&AggregateId::from(id)).await?;
    Ok(Json(MachineResponse::from(&machine)))
}

/// PATCH /api/v1/machines/{id} — load a coffee into the machine.
///
/// The coffee has to exist.
#[tracing::instrument(skip(state))]
pub async fn load_coffee<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<LoadCoffeeRequest>,
) -> Result<Json<MachineResponse>, ApiError> {
    let coffee_id = AggregateId::from(req.coffee_id);
    state.coffees.find(&coffee_id).await?;

    let machine = state
        .machines
        .load_coffee(&AggregateId::from(id), &coffee_id)
        .await?;
    Ok(Json(MachineResponse::from(&machine)))
}

/// GET /api/v1/machines/{id}/coffee — the coffee currently loaded.
#[tracing::instrument(skip(state))]
pub async fn current_coffee<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CurrentCoffeeResponse>, ApiError> {
    let machine = state.machines.find(&AggregateId::from(id.as_str())).await?;
    let coffee_id = machine.current_coffee().map_err(domain::DomainError::from)?;

    Ok(Json(CurrentCoffeeResponse {
        machine_id: id,
        coffee_id: coffee_id.to_string(),
    }))
}
