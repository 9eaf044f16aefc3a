use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AggregateId;

/// Number of events stored for one aggregate, used for optimistic
/// concurrency control.
///
/// A version of 0 means no events exist; after the first event has been
/// appended the aggregate is at version 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for a new aggregate.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for the first event.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the version reached after `count` more events.
    pub fn advance(&self, count: usize) -> Self {
        Self(self.0 + count as i64)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A persisted event row.
///
/// The aggregate ID, type tag and timestamp are duplicated out of the payload
/// so the store can filter on them without understanding the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Position in the global log. Strictly increasing across all aggregates.
    pub sequence_id: i64,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type tag of the event (e.g., "AccountCreated").
    pub event_type: String,

    /// When the event occurred.
    pub occurred_on: DateTime<Utc>,

    /// The serialized event.
    pub payload: Vec<u8>,
}

/// An event row that has not been written yet.
///
/// The store assigns the sequence ID on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEventEntry {
    pub aggregate_id: AggregateId,
    pub event_type: String,
    pub occurred_on: DateTime<Utc>,
    pub payload: Vec<u8>,
}

impl NewEventEntry {
    /// Creates a new, not yet persisted entry.
    pub fn new(
        aggregate_id: AggregateId,
        event_type: impl Into<String>,
        occurred_on: DateTime<Utc>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            aggregate_id,
            event_type: event_type.into(),
            occurred_on,
            payload,
        }
    }

    /// Turns this entry into a stored one with the given sequence ID.
    pub fn into_entry(self, sequence_id: i64) -> EventEntry {
        EventEntry {
            sequence_id,
            aggregate_id: self.aggregate_id,
            event_type: self.event_type,
            occurred_on: self.occurred_on,
            payload: self.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        let v1 = Version::new(1);
        let v2 = Version::new(2);
        assert!(v1 < v2);
        assert_eq!(v1.next(), v2);
    }

    #[test]
    fn version_initial_and_first() {
        assert_eq!(Version::initial().as_i64(), 0);
        assert_eq!(Version::first().as_i64(), 1);
        assert_eq!(Version::initial().next(), Version::first());
        assert_eq!(Version::first().advance(3), Version::new(4));
    }

    #[test]
    fn new_entry_keeps_fields_when_stored() {
        let aggregate_id = AggregateId::from("acc-1");
        let occurred_on = Utc::now();
        let entry = NewEventEntry::new(
            aggregate_id.clone(),
            "AccountCreated",
            occurred_on,
            b"{}".to_vec(),
        )
        .into_entry(7);

        assert_eq!(entry.sequence_id, 7);
        assert_eq!(entry.aggregate_id, aggregate_id);
        assert_eq!(entry.event_type, "AccountCreated");
        assert_eq!(entry.occurred_on, occurred_on);
        assert_eq!(entry.payload, b"{}".to_vec());
    }
}
