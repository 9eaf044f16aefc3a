//! Domain error types.

use common::AggregateId;
use event_store::EventStoreError;
use thiserror::Error;

use crate::account::AccountError;
use crate::coffee::CoffeeError;
use crate::machine::MachineError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the account aggregate.
    #[error("Account error: {0}")]
    Account(AccountError),

    /// An error occurred in the coffee aggregate.
    #[error("Coffee error: {0}")]
    Coffee(CoffeeError),

    /// An error occurred in the machine aggregate.
    #[error("Machine error: {0}")]
    Machine(MachineError),

    /// No events are stored for the aggregate.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    NotFound {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
    },

    /// A stored event carries a type tag this aggregate cannot decode.
    #[error("Unknown event type {event_type} in history of {aggregate_type} {aggregate_id}")]
    UnknownEventType {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
        event_type: String,
    },

    /// The stored history cannot be folded into a valid aggregate.
    #[error("Corrupt history for {aggregate_type} {aggregate_id}: {reason}")]
    CorruptHistory {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
        reason: String,
    },

    /// An aggregate without a creation event was handed over for persisting.
    #[error("Cannot persist a {aggregate_type} that was never created")]
    NotCreated { aggregate_type: &'static str },

    /// The event store failed.
    #[error("Storage error during {operation} of {target}: {source}")]
    Storage {
        operation: &'static str,
        target: String,
        #[source]
        source: EventStoreError,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub(crate) fn storage(
        operation: &'static str,
        target: impl std::fmt::Display,
    ) -> impl FnOnce(EventStoreError) -> Self {
        let target = target.to_string();
        move |source| DomainError::Storage {
            operation,
            target,
            source,
        }
    }

    /// Returns true if a caller-supplied value violated a domain invariant.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            DomainError::Account(e) => e.is_invalid_input(),
            DomainError::Coffee(e) => e.is_invalid_input(),
            DomainError::Machine(e) => e.is_invalid_input(),
            _ => false,
        }
    }

    /// Returns true if the aggregate (or the loaded coffee of a machine) does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound { .. } | DomainError::Machine(MachineError::NotLoaded)
        )
    }

    /// Returns true if another writer changed the aggregate concurrently.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::Storage {
                source: EventStoreError::ConcurrencyConflict { .. },
                ..
            }
        )
    }
}

impl From<AccountError> for DomainError {
    fn from(e: AccountError) -> Self {
        DomainError::Account(e)
    }
}

impl From<CoffeeError> for DomainError {
    fn from(e: CoffeeError) -> Self {
        DomainError::Coffee(e)
    }
}

impl From<MachineError> for DomainError {
    fn from(e: MachineError) -> Self {
        DomainError::Machine(e)
    }
}
