//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::Version;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense. Each aggregate
/// kind has one closed enum of events.
pub trait DomainEvent:
    Serialize + DeserializeOwned + Send + Sync + Clone + PartialEq + std::fmt::Debug
{
    /// Returns the event type name.
    ///
    /// This is used for serialization and event store filtering.
    fn event_type(&self) -> &'static str;

    /// Returns the ID of the aggregate the event belongs to.
    fn aggregate_id(&self) -> &AggregateId;

    /// Returns when the event occurred.
    fn occurred_on(&self) -> DateTime<Utc>;

    /// Returns every type tag this event enum can be decoded from.
    fn event_types() -> &'static [&'static str];
}

/// An event was applied to an aggregate it does not belong to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event for aggregate {actual} cannot be applied to aggregate {expected}")]
pub struct AggregateMismatch {
    pub expected: AggregateId,
    pub actual: AggregateId,
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is a cluster of domain objects that can be treated as a single unit.
/// The aggregate root ensures consistency of changes being made within the aggregate.
///
/// In event sourcing, aggregates:
/// - Are rebuilt by replaying events
/// - Validate operations and record the resulting events through `apply`
/// - Keep newly recorded events in a buffer until the repository persists them
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync + From<AggregateMismatch>;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the tag of the event that brings an aggregate of this kind
    /// into existence. Used to enumerate all aggregates of the kind.
    fn created_event_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<&AggregateId>;

    /// Returns the number of committed events this aggregate was built from.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    fn set_version(&mut self, version: Version);

    /// Updates the state for one event.
    ///
    /// Must be deterministic. Fails when the event is not legal in the
    /// current state (e.g. a second creation event or a stored price that
    /// violates the price invariant).
    fn transition(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// The events recorded since the aggregate was loaded or last persisted.
    fn uncommitted_buffer(&self) -> &[Self::Event];

    /// Mutable access to the uncommitted event buffer.
    fn uncommitted_buffer_mut(&mut self) -> &mut Vec<Self::Event>;

    /// Applies an event: checks it targets this aggregate, folds it into the
    /// state and records it as uncommitted.
    fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error> {
        if let Some(id) = self.id()
            && id != event.aggregate_id()
        {
            return Err(AggregateMismatch {
                expected: id.clone(),
                actual: event.aggregate_id().clone(),
            }
            .into());
        }

        self.transition(&event)?;
        self.uncommitted_buffer_mut().push(event);
        Ok(())
    }

    /// Returns the events that have not been persisted yet.
    fn uncommitted_events(&self) -> &[Self::Event] {
        self.uncommitted_buffer()
    }

    /// Removes and returns the events that have not been persisted yet.
    fn take_uncommitted(&mut self) -> Vec<Self::Event> {
        std::mem::take(self.uncommitted_buffer_mut())
    }

    /// Forgets the uncommitted events, e.g. after they have been persisted.
    fn clear_uncommitted(&mut self) {
        self.uncommitted_buffer_mut().clear();
    }
}
