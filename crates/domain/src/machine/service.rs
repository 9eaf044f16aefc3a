//! Machine service providing a simplified API for machine operations.

use common::AggregateId;
use event_store::EventStore;

use crate::error::DomainError;
use crate::repository::Repository;

use super::Machine;

/// Service for managing machines.
pub struct MachineService<S: EventStore> {
    repository: Repository<S, Machine>,
}

impl<S: EventStore + Clone> Clone for MachineService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<S: EventStore> MachineService<S> {
    pub fn new(store: S) -> Self {
        Self {
            repository: Repository::new(store),
        }
    }

    pub fn repository(&self) -> &Repository<S, Machine> {
        &self.repository
    }

    /// Installs a new machine.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, brand: &str, model: &str) -> Result<Machine, DomainError> {
        let machine = Machine::create(brand, model)?;
        self.repository.create(machine).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn find(&self, machine_id: &AggregateId) -> Result<Machine, DomainError> {
        self.repository.load(machine_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Machine>, DomainError> {
        self.repository.list_all().await
    }

    /// Records that `coffee_id` is now loaded into the machine.
    ///
    /// Does not check that the coffee exists; callers that need that
    /// guarantee look it up first.
    #[tracing::instrument(skip(self))]
    pub async fn load_coffee(
        &self,
        machine_id: &AggregateId,
        coffee_id: &AggregateId,
    ) -> Result<Machine, DomainError> {
        let coffee_id = coffee_id.clone();
        self.repository
            .execute(machine_id, |machine| machine.load_coffee(coffee_id))
            .await
    }
}
