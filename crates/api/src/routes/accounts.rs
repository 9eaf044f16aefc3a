//! Account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use domain::{Account, Aggregate};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::parse_money;
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    #[serde(default)]
    pub reason: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub owner: String,
    pub balance: f64,
    pub consumed_total: u64,
    pub version: i64,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().map(|id| id.to_string()).unwrap_or_default(),
            owner: account.owner().to_string(),
            balance: account.balance().as_decimal(),
            consumed_total: account.consumed_total(),
            version: account.version().as_i64(),
        }
    }
}

// -- Handlers --

/// POST /api/v1/accounts — open a new account.
#[tracing::instrument(skip(state))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = state.accounts.create(&req.owner).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// GET /api/v1/accounts — list all accounts.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.accounts.list_all().await?;
    Ok(Json(accounts.iter().map(AccountResponse::from).collect()))
}

/// GET /api/v1/accounts/{id} — load one account.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.find(&AggregateId::from(id)).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// POST /api/v1/accounts/{id}/payments — pay money into an account.
#[tracing::instrument(skip(state))]
pub async fn pay<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let amount = parse_money(req.amount, "amount")?;
    let account = state
        .accounts
        .pay(&AggregateId::from(id), amount, &req.reason)
        .await?;
    Ok(Json(AccountResponse::from(&account)))
}
