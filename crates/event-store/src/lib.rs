//! Append-only event persistence for the coffy event-sourcing system.
//!
//! The store knows nothing about the domain: it keeps opaque payloads keyed
//! by aggregate ID and tagged with an event type, in insertion order.

pub mod error;
pub mod event;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEntry, NewEventEntry, Version};
pub use memory::InMemoryEventStore;
pub use sqlite::SqliteEventStore;
pub use store::{AppendOptions, EventStore, EventStoreExt};
