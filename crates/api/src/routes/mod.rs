//! HTTP route handlers.

pub mod accounts;
pub mod coffees;
pub mod consume;
pub mod events;
pub mod health;
pub mod machines;
pub mod metrics;

use common::Money;

use crate::error::ApiError;

/// Largest absolute amount, in major units, accepted in a request body.
pub const MAX_REQUEST_AMOUNT: f64 = 1_000_000_000.0;

/// Converts a decimal amount from a request body into `Money`.
pub(crate) fn parse_money(value: f64, field: &str) -> Result<Money, ApiError> {
    if value.abs() > MAX_REQUEST_AMOUNT {
        return Err(ApiError::BadRequest(format!(
            "Invalid {field}: {value} (limit is {MAX_REQUEST_AMOUNT})"
        )));
    }
    Money::from_decimal(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {field}: {value}")))
}
