//! Shared types for the coffy event-sourcing system.

mod money;
mod types;

pub use money::Money;
pub use types::AggregateId;
