//! Coffee endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{Aggregate, Coffee, CoffeeDetails, NewCoffee};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::parse_money;
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateCoffeeRequest {
    pub name: String,
    pub price: f64,
    pub cupping_score: Option<i64>,
    pub details: Option<CoffeeDetails>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePriceRequest {
    pub price: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CuppingScoreRequest {
    pub score: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CoffeeResponse {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub cupping_score: Option<u8>,
    pub details: Option<CoffeeDetails>,
    pub version: i64,
}

impl From<&Coffee> for CoffeeResponse {
    fn from(coffee: &Coffee) -> Self {
        Self {
            id: coffee.id().map(|id| id.to_string()).unwrap_or_default(),
            name: coffee.name().to_string(),
            price: coffee.price().as_decimal(),
            cupping_score: coffee.cupping_score().map(|s| s.value()),
            details: coffee.details().cloned(),
            version: coffee.version().as_i64(),
        }
    }
}

// -- Handlers --

/// POST /api/v1/coffees — add a coffee.
#[tracing::instrument(skip(state))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateCoffeeRequest>,
) -> Result<(StatusCode, Json<CoffeeResponse>), ApiError> {
    let new = NewCoffee {
        name: req.name,
        price: parse_money(req.price, "price")?,
        cupping_score: req.cupping_score,
        details: req.details,
    };
    let coffee = state.coffees.create(new).await?;
    Ok((StatusCode::CREATED, Json(CoffeeResponse::from(&coffee))))
}

/// GET /api/v1/coffees — list all coffees.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CoffeeResponse>>, ApiError> {
    let coffees = state.coffees.list_all().await?;
    Ok(Json(coffees.iter().map(CoffeeResponse::from).collect()))
}

/// GET /api/v1/coffees/{id} — load one coffee.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CoffeeResponse>, ApiError> {
    let coffee = state.coffees.find(&AggregateId::from(id)).await?;
    Ok(Json(CoffeeResponse::from(&coffee)))
}

/// POST /api/v1/coffees/{id}/price — change the price.
#[tracing::instrument(skip(state))]
pub async fn change_price<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ChangePriceRequest>,
) -> Result<Json<CoffeeResponse>, ApiError> {
    let price = parse_money(req.price, "price")?;
    let coffee = state
        .coffees
        .change_price(&AggregateId::from(id), price, &req.reason)
        .await?;
    Ok(Json(CoffeeResponse::from(&coffee)))
}

/// POST /api/v1/coffees/{id}/cupping-score — set the cupping score.
#[tracing::instrument(skip(state))]
pub async fn set_cupping_score<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CuppingScoreRequest>,
) -> Result<Json<CoffeeResponse>, ApiError> {
    let coffee = state
        .coffees
        .set_cupping_score(&AggregateId::from(id), req.score)
        .await?;
    Ok(Json(CoffeeResponse::from(&coffee)))
}

/// PUT /api/v1/coffees/{id}/details — replace the details.
#[tracing::instrument(skip(state, details))]
pub async fn update_details<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(details): Json<CoffeeDetails>,
) -> Result<Json<CoffeeResponse>, ApiError> {
    let coffee = state
        .coffees
        .update_details(&AggregateId::from(id), details)
        .await?;
    Ok(Json(CoffeeResponse::from(&coffee)))
}
