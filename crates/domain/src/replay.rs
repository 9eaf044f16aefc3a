//! Rebuilding aggregates from stored history and encoding new events.

use common::AggregateId;
use event_store::{EventEntry, NewEventEntry, Version};

use crate::aggregate::{Aggregate, AggregateMismatch, DomainEvent};
use crate::error::DomainError;

/// Folds the stored history of one aggregate into a hydrated instance.
///
/// Entries must be in insertion order. The returned aggregate has an empty
/// uncommitted buffer and its version set to the number of entries.
pub fn replay<A: Aggregate>(
    aggregate_id: &AggregateId,
    entries: &[EventEntry],
) -> Result<A, DomainError> {
    if entries.is_empty() {
        return Err(DomainError::NotFound {
            aggregate_type: A::aggregate_type(),
            aggregate_id: aggregate_id.clone(),
        });
    }

    let corrupt = |reason: String| DomainError::CorruptHistory {
        aggregate_type: A::aggregate_type(),
        aggregate_id: aggregate_id.clone(),
        reason,
    };

    let mut aggregate = A::default();
    for entry in entries {
        if !A::Event::event_types().contains(&entry.event_type.as_str()) {
            return Err(DomainError::UnknownEventType {
                aggregate_type: A::aggregate_type(),
                aggregate_id: aggregate_id.clone(),
                event_type: entry.event_type.clone(),
            });
        }

        let event: A::Event = serde_json::from_slice(&entry.payload).map_err(|e| {
            corrupt(format!(
                "event {} cannot be decoded: {e}",
                entry.sequence_id
            ))
        })?;

        if event.event_type() != entry.event_type {
            return Err(corrupt(format!(
                "event {} is tagged {} but contains {}",
                entry.sequence_id,
                entry.event_type,
                event.event_type()
            )));
        }

        if event.aggregate_id() != aggregate_id {
            let mismatch = AggregateMismatch {
                expected: aggregate_id.clone(),
                actual: event.aggregate_id().clone(),
            };
            return Err(corrupt(mismatch.to_string()));
        }

        aggregate
            .apply(event)
            .map_err(|e| corrupt(format!("event {} rejected: {e}", entry.sequence_id)))?;
    }

    aggregate.clear_uncommitted();
    aggregate.set_version(Version::initial().advance(entries.len()));

    tracing::debug!(
        aggregate_type = A::aggregate_type(),
        %aggregate_id,
        events = entries.len(),
        "replayed aggregate"
    );
    metrics::counter!("aggregate_replays_total", "aggregate" => A::aggregate_type()).increment(1);

    Ok(aggregate)
}

/// Serializes domain events into store rows.
///
/// The row's aggregate ID, type tag and timestamp are copied from the event.
pub fn encode_events<E: DomainEvent>(events: &[E]) -> Result<Vec<NewEventEntry>, DomainError> {
    events
        .iter()
        .map(|event| {
            Ok(NewEventEntry::new(
                event.aggregate_id().clone(),
                event.event_type(),
                event.occurred_on(),
                serde_json::to_vec(event)?,
            ))
        })
        .collect()
}
