//! Consume endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::AggregateId;
use domain::Receipt;
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub account_id: String,
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Serialize)]
pub struct ReceiptResponse {
    pub recipient: String,
    pub submitter: String,
    pub amount: f64,
    pub purpose: String,
    pub date: String,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        Self {
            recipient: receipt.recipient,
            submitter: receipt.submitter,
            amount: receipt.amount.as_decimal(),
            purpose: receipt.purpose,
            date: receipt.date.to_rfc3339(),
        }
    }
}

/// POST /api/v1/consume — charge an account for a coffee.
#[tracing::instrument(skip(state))]
pub async fn consume<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ConsumeRequest>,
) -> Result<(StatusCode, Json<ReceiptResponse>), ApiError> {
    let receipt = state
        .consume
        .consume(
            &AggregateId::from(req.account_id),
            &AggregateId::from(req.product_id),
            req.quantity,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReceiptResponse::from(receipt))))
}
