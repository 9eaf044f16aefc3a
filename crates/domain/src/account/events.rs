//! Account domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on an account aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AccountEvent {
    /// Account was opened for an owner.
    AccountCreated(AccountCreatedData),

    /// A product was consumed and charged to the account.
    CoffeeConsumed(CoffeeConsumedData),

    /// Money was paid into the account.
    IncomingPayment(IncomingPaymentData),
}

impl DomainEvent for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::AccountCreated(_) => "AccountCreated",
            AccountEvent::CoffeeConsumed(_) => "CoffeeConsumed",
            AccountEvent::IncomingPayment(_) => "IncomingPayment",
        }
    }

    fn aggregate_id(&self) -> &AggregateId {
        match self {
            AccountEvent::AccountCreated(data) => &data.account_id,
            AccountEvent::CoffeeConsumed(data) => &data.account_id,
            AccountEvent::IncomingPayment(data) => &data.account_id,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            AccountEvent::AccountCreated(data) => data.occurred_on,
            AccountEvent::CoffeeConsumed(data) => data.occurred_on,
            AccountEvent::IncomingPayment(data) => data.occurred_on,
        }
    }

    fn event_types() -> &'static [&'static str] {
        &["AccountCreated", "CoffeeConsumed", "IncomingPayment"]
    }
}

/// Data for AccountCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCreatedData {
    /// The unique account ID.
    pub account_id: AggregateId,

    /// Who the account belongs to.
    pub owner: String,

    pub occurred_on: DateTime<Utc>,
}

/// Data for CoffeeConsumed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeConsumedData {
    pub account_id: AggregateId,

    /// Price charged for one unit.
    pub price: Money,

    /// Label of the consumed product.
    pub product: String,

    pub occurred_on: DateTime<Utc>,
}

/// Data for IncomingPayment event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingPaymentData {
    pub account_id: AggregateId,

    /// Amount paid in.
    pub amount: Money,

    /// Free-text context, may be empty.
    pub reason: String,

    pub occurred_on: DateTime<Utc>,
}

// Convenience constructors
impl AccountEvent {
    pub fn account_created(account_id: AggregateId, owner: impl Into<String>) -> Self {
        AccountEvent::AccountCreated(AccountCreatedData {
            account_id,
            owner: owner.into(),
            occurred_on: Utc::now(),
        })
    }

    pub fn coffee_consumed(
        account_id: AggregateId,
        price: Money,
        product: impl Into<String>,
    ) -> Self {
        AccountEvent::CoffeeConsumed(CoffeeConsumedData {
            account_id,
            price,
            product: product.into(),
            occurred_on: Utc::now(),
        })
    }

    pub fn incoming_payment(
        account_id: AggregateId,
        amount: Money,
        reason: impl Into<String>,
    ) -> Self {
        AccountEvent::IncomingPayment(IncomingPaymentData {
            account_id,
            amount,
            reason: reason.into(),
            occurred_on: Utc::now(),
        })
    }
}
