//! Cross-aggregate workflow: charging an account for a coffee.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money};
use event_store::EventStore;
use thiserror::Error;

use crate::account::{Account, AccountError, AccountService, MAX_CONSUME_QUANTITY};
use crate::coffee::{Coffee, CoffeeService};
use crate::error::DomainError;

/// Who a consumption receipt is issued by.
pub const RECEIPT_RECIPIENT: &str = "Coffy - Consume Service";

/// Proof of a consumption. Computed for the response, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub recipient: String,

    /// Owner of the charged account.
    pub submitter: String,

    /// Price times quantity.
    pub amount: Money,

    pub purpose: String,
    pub date: DateTime<Utc>,
}

/// Errors that can occur while consuming.
#[derive(Debug, Error)]
pub enum ConsumeError {
    #[error("Account not found: {0}")]
    AccountNotFound(AggregateId),

    #[error("Product not found: {0}")]
    ProductNotFound(AggregateId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Charges accounts for coffees at the coffee's current price.
pub struct ConsumeService<S: EventStore> {
    accounts: AccountService<S>,
    coffees: CoffeeService<S>,
}

impl<S: EventStore + Clone> Clone for ConsumeService<S> {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            coffees: self.coffees.clone(),
        }
    }
}

impl<S: EventStore> ConsumeService<S> {
    /// Creates the workflow on top of existing services, sharing their
    /// per-aggregate locks.
    pub fn new(accounts: AccountService<S>, coffees: CoffeeService<S>) -> Self {
        Self { accounts, coffees }
    }

    /// Charges `quantity` units of a coffee to an account.
    ///
    /// All units are appended as one batch. A quantity of zero checks that
    /// both aggregates exist and returns a zero receipt without writing.
    #[tracing::instrument(skip(self))]
    pub async fn consume(
        &self,
        account_id: &AggregateId,
        coffee_id: &AggregateId,
        quantity: u32,
    ) -> Result<Receipt, ConsumeError> {
        if quantity > MAX_CONSUME_QUANTITY {
            return Err(DomainError::from(AccountError::QuantityTooLarge {
                quantity,
                max: MAX_CONSUME_QUANTITY,
            })
            .into());
        }

        let account = self
            .accounts
            .find(account_id)
            .await
            .map_err(|e| not_found_as(e, ConsumeError::AccountNotFound(account_id.clone())))?;

        let coffee = self
            .coffees
            .find(coffee_id)
            .await
            .map_err(|e| not_found_as(e, ConsumeError::ProductNotFound(coffee_id.clone())))?;

        let amount = coffee.price().checked_mul(quantity).ok_or_else(|| {
            DomainError::from(AccountError::AmountOutOfRange {
                amount: coffee.price(),
            })
        })?;

        let account = if quantity == 0 {
            account
        } else {
            self.charge(account_id, &coffee, quantity).await?
        };

        metrics::counter!("coffee_consumed_total").increment(u64::from(quantity));
        tracing::info!(%account_id, %coffee_id, quantity, "coffee consumed");

        Ok(Receipt {
            recipient: RECEIPT_RECIPIENT.to_string(),
            submitter: account.owner().to_string(),
            amount,
            purpose: format!("consumption of '{}'", coffee.name()),
            date: Utc::now(),
        })
    }

    async fn charge(
        &self,
        account_id: &AggregateId,
        coffee: &Coffee,
        quantity: u32,
    ) -> Result<Account, ConsumeError> {
        self.accounts
            .repository()
            .execute(account_id, |account| {
                account.consume_n(coffee.price(), coffee.name(), quantity)
            })
            .await
            .map_err(|e| not_found_as(e, ConsumeError::AccountNotFound(account_id.clone())))
    }
}

fn not_found_as(error: DomainError, replacement: ConsumeError) -> ConsumeError {
    match error {
        DomainError::NotFound { .. } => replacement,
        other => ConsumeError::Domain(other),
    }
}
