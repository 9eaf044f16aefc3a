use async_trait::async_trait;

use crate::{AggregateId, EventEntry, EventStoreError, NewEventEntry, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the aggregate for optimistic concurrency control.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the aggregate to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the aggregate to not exist (new aggregate).
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for event store implementations.
///
/// An event store is an append-only log of events keyed by aggregate ID.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events for a single aggregate.
    ///
    /// The batch is written atomically - either all entries become visible,
    /// in the given order, or none do. If `options.expected_version` is set,
    /// the operation fails with `ConcurrencyConflict` when the number of
    /// events already stored for the aggregate differs.
    ///
    /// Returns the stored entries with their assigned sequence IDs.
    async fn append(
        &self,
        entries: Vec<NewEventEntry>,
        options: AppendOptions,
    ) -> Result<Vec<EventEntry>>;

    /// Retrieves all events for a specific aggregate.
    ///
    /// Events are returned in insertion order (sequence ID ascending).
    /// An unknown aggregate yields an empty list, not an error.
    async fn load_all(&self, aggregate_id: &AggregateId) -> Result<Vec<EventEntry>>;

    /// Retrieves every event with the given type tag, in insertion order.
    async fn fetch_by_type(&self, event_type: &str) -> Result<Vec<EventEntry>>;

    /// Gets the current version (event count) of an aggregate.
    async fn aggregate_version(&self, aggregate_id: &AggregateId) -> Result<Version>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Checks if an aggregate exists (has any events).
    async fn aggregate_exists(&self, aggregate_id: &AggregateId) -> Result<bool> {
        Ok(self.aggregate_version(aggregate_id).await? > Version::initial())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates a batch before appending and returns the aggregate it targets.
pub(crate) fn validate_batch(entries: &[NewEventEntry]) -> Result<AggregateId> {
    let Some(first) = entries.first() else {
        return Err(EventStoreError::InvalidBatch(
            "cannot append empty event list".to_string(),
        ));
    };

    if let Some(other) = entries
        .iter()
        .find(|e| e.aggregate_id != first.aggregate_id)
    {
        return Err(EventStoreError::InvalidBatch(format!(
            "all events must be for the same aggregate: found {} and {}",
            first.aggregate_id, other.aggregate_id
        )));
    }

    if let Some(untyped) = entries.iter().find(|e| e.event_type.is_empty()) {
        return Err(EventStoreError::InvalidBatch(format!(
            "event for aggregate {} has an empty type tag",
            untyped.aggregate_id
        )));
    }

    Ok(first.aggregate_id.clone())
}

/// Checks the optimistic concurrency token against the stored version.
pub(crate) fn check_expected_version(
    aggregate_id: &AggregateId,
    options: &AppendOptions,
    actual: Version,
) -> Result<()> {
    match options.expected_version {
        Some(expected) if expected != actual => Err(EventStoreError::ConcurrencyConflict {
            aggregate_id: aggregate_id.clone(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(aggregate_id: &str, event_type: &str) -> NewEventEntry {
        NewEventEntry::new(
            AggregateId::from(aggregate_id),
            event_type,
            Utc::now(),
            b"{}".to_vec(),
        )
    }

    #[test]
    fn empty_batch_is_rejected() {
        let result = validate_batch(&[]);
        assert!(matches!(result, Err(EventStoreError::InvalidBatch(_))));
    }

    #[test]
    fn mixed_aggregate_batch_is_rejected() {
        let result = validate_batch(&[entry("a", "Created"), entry("b", "Created")]);
        assert!(matches!(result, Err(EventStoreError::InvalidBatch(_))));
    }

    #[test]
    fn untyped_entry_is_rejected() {
        let result = validate_batch(&[entry("a", "Created"), entry("a", "")]);
        assert!(matches!(result, Err(EventStoreError::InvalidBatch(_))));
    }

    #[test]
    fn valid_batch_returns_aggregate_id() {
        let id = validate_batch(&[entry("a", "Created"), entry("a", "Updated")]).unwrap();
        assert_eq!(id, AggregateId::from("a"));
    }

    #[test]
    fn expected_version_mismatch_is_a_conflict() {
        let id = AggregateId::from("a");
        let options = AppendOptions::expect_version(Version::new(2));

        assert!(check_expected_version(&id, &options, Version::new(2)).is_ok());
        assert!(matches!(
            check_expected_version(&id, &options, Version::new(3)),
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
        assert!(check_expected_version(&id, &AppendOptions::new(), Version::new(9)).is_ok());
    }
}
