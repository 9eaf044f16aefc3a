//! Account aggregate: a customer's ledger of payments and consumptions.

mod aggregate;
mod events;
mod service;

pub use aggregate::{Account, MAX_CONSUME_QUANTITY};
pub use events::{AccountCreatedData, AccountEvent, CoffeeConsumedData, IncomingPaymentData};
pub use service::AccountService;

use common::Money;
use thiserror::Error;

use crate::aggregate::AggregateMismatch;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Owner is required.
    #[error("Owner is required")]
    OwnerRequired,

    /// Payment or consumption amount below zero.
    #[error("Invalid amount: {amount} (must not be negative)")]
    NegativeAmount { amount: Money },

    /// The resulting balance or total does not fit into `Money`.
    #[error("Amount out of range: {amount}")]
    AmountOutOfRange { amount: Money },

    #[error("Quantity {quantity} exceeds the maximum of {max}")]
    QuantityTooLarge { quantity: u32, max: u32 },

    /// Account is already created.
    #[error("Account already created")]
    AlreadyCreated,

    /// Operation on an account that was never created.
    #[error("Account not created")]
    NotCreated,

    #[error(transparent)]
    Mismatch(#[from] AggregateMismatch),
}

impl AccountError {
    /// Returns true for errors caused by invalid caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AccountError::OwnerRequired
                | AccountError::NegativeAmount { .. }
                | AccountError::AmountOutOfRange { .. }
                | AccountError::QuantityTooLarge { .. }
        )
    }
}
