use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEntry, NewEventEntry, Result, Version,
    store::{AppendOptions, EventStore, check_expected_version, validate_batch},
};

#[derive(Default)]
struct Log {
    entries: Vec<EventEntry>,
    last_sequence_id: i64,
}

/// In-memory event store implementation.
///
/// Provides the same interface as the SQLite implementation. Used by the
/// tests and by the server when no database is configured.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.log.read().await.entries.len()
    }
}

fn count_for(entries: &[EventEntry], aggregate_id: &AggregateId) -> Version {
    let count = entries
        .iter()
        .filter(|e| &e.aggregate_id == aggregate_id)
        .count();
    Version::initial().advance(count)
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        entries: Vec<NewEventEntry>,
        options: AppendOptions,
    ) -> Result<Vec<EventEntry>> {
        let aggregate_id = validate_batch(&entries)?;

        // The write guard is held for the whole batch, so readers never see
        // a partially applied append.
        let mut log = self.log.write().await;

        let current_version = count_for(&log.entries, &aggregate_id);
        check_expected_version(&aggregate_id, &options, current_version)?;

        let mut stored = Vec::with_capacity(entries.len());
        for entry in entries {
            log.last_sequence_id += 1;
            stored.push(entry.into_entry(log.last_sequence_id));
        }
        log.entries.extend(stored.iter().cloned());

        tracing::debug!(%aggregate_id, count = stored.len(), "appended events");
        metrics::counter!("events_appended_total").increment(stored.len() as u64);

        Ok(stored)
    }

    async fn load_all(&self, aggregate_id: &AggregateId) -> Result<Vec<EventEntry>> {
        let log = self.log.read().await;
        Ok(log
            .entries
            .iter()
            .filter(|e| &e.aggregate_id == aggregate_id)
            .cloned()
            .collect())
    }

    async fn fetch_by_type(&self, event_type: &str) -> Result<Vec<EventEntry>> {
        let log = self.log.read().await;
        Ok(log
            .entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn aggregate_version(&self, aggregate_id: &AggregateId) -> Result<Version> {
        let log = self.log.read().await;
        Ok(count_for(&log.entries, aggregate_id))
    }
}
