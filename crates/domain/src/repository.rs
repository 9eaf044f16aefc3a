//! Loading and persisting aggregates.

use std::collections::HashSet;
use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventStore};

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::lock::AggregateLocks;
use crate::replay::{encode_events, replay};

/// Generic repository for one aggregate kind.
///
/// The repository is responsible for:
/// 1. Loading an aggregate by replaying its history from the event store
/// 2. Persisting the events an operation recorded, guarded by the aggregate's
///    version so concurrent writers cannot interleave
/// 3. Enumerating all aggregates of its kind
pub struct Repository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    locks: AggregateLocks,
    _phantom: PhantomData<fn() -> A>,
}

impl<S, A> Clone for Repository<S, A>
where
    S: EventStore + Clone,
    A: Aggregate,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            locks: self.locks.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<S, A> Repository<S, A>
where
    S: EventStore,
    A: Aggregate,
    DomainError: From<A::Error>,
{
    /// Creates a new repository with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: AggregateLocks::new(),
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate from its stored history.
    ///
    /// Fails with `NotFound` if no events are stored for the ID.
    pub async fn load(&self, aggregate_id: &AggregateId) -> Result<A, DomainError> {
        let entries = self
            .store
            .load_all(aggregate_id)
            .await
            .map_err(DomainError::storage("load", aggregate_id))?;

        replay(aggregate_id, &entries)
    }

    /// Persists a newly built aggregate.
    ///
    /// Fails with a concurrency conflict if events already exist for its ID,
    /// and with `NotCreated` if the aggregate has no creation event.
    pub async fn create(&self, mut aggregate: A) -> Result<A, DomainError> {
        let Some(aggregate_id) = aggregate.id().cloned() else {
            return Err(DomainError::NotCreated {
                aggregate_type: A::aggregate_type(),
            });
        };

        let _guard = self.locks.acquire(&aggregate_id).await;
        self.persist(&aggregate_id, &mut aggregate, AppendOptions::expect_new(), "create")
            .await?;
        Ok(aggregate)
    }

    /// Loads an aggregate, runs `operation` on it and persists the events it
    /// recorded.
    ///
    /// The whole cycle holds the aggregate's lock, and the append is checked
    /// against the loaded version. If the operation fails nothing is written.
    pub async fn execute<F>(&self, aggregate_id: &AggregateId, operation: F) -> Result<A, DomainError>
    where
        F: FnOnce(&mut A) -> Result<(), A::Error>,
    {
        let _guard = self.locks.acquire(aggregate_id).await;

        let mut aggregate = self.load(aggregate_id).await?;
        let loaded_version = aggregate.version();

        operation(&mut aggregate)?;

        self.persist(
            aggregate_id,
            &mut aggregate,
            AppendOptions::expect_version(loaded_version),
            "execute",
        )
        .await?;

        Ok(aggregate)
    }

    /// Returns the IDs of every aggregate of this kind, in creation order.
    pub async fn list_ids(&self) -> Result<Vec<AggregateId>, DomainError> {
        let entries = self
            .store
            .fetch_by_type(A::created_event_type())
            .await
            .map_err(DomainError::storage("list", A::aggregate_type()))?;

        let mut seen = HashSet::new();
        Ok(entries
            .into_iter()
            .map(|entry| entry.aggregate_id)
            .filter(|id| seen.insert(id.clone()))
            .collect())
    }

    /// Loads every aggregate of this kind, in creation order.
    pub async fn list_all(&self) -> Result<Vec<A>, DomainError> {
        let ids = self.list_ids().await?;
        let mut aggregates = Vec::with_capacity(ids.len());
        for id in &ids {
            aggregates.push(self.load(id).await?);
        }
        Ok(aggregates)
    }

    async fn persist(
        &self,
        aggregate_id: &AggregateId,
        aggregate: &mut A,
        options: AppendOptions,
        operation: &'static str,
    ) -> Result<(), DomainError> {
        let events = aggregate.uncommitted_events();
        if events.is_empty() {
            return Ok(());
        }

        let entries = encode_events(events)?;
        let stored = self
            .store
            .append(entries, options)
            .await
            .map_err(DomainError::storage(operation, aggregate_id))?;

        aggregate.set_version(aggregate.version().advance(stored.len()));
        aggregate.clear_uncommitted();
        Ok(())
    }
}
