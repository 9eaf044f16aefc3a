//! Coffee service providing a simplified API for coffee operations.

use common::{AggregateId, Money};
use event_store::EventStore;

use crate::error::DomainError;
use crate::repository::Repository;

use super::{Coffee, CoffeeDetails, NewCoffee};

/// Service for managing coffees.
pub struct CoffeeService<S: EventStore> {
    repository: Repository<S, Coffee>,
}

impl<S: EventStore + Clone> Clone for CoffeeService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<S: EventStore> CoffeeService<S> {
    /// Creates a new coffee service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            repository: Repository::new(store),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &Repository<S, Coffee> {
        &self.repository
    }

    /// Adds a coffee to the assortment.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, new: NewCoffee) -> Result<Coffee, DomainError> {
        let coffee = Coffee::create(new)?;
        self.repository.create(coffee).await
    }

    /// Loads a coffee by ID.
    #[tracing::instrument(skip(self))]
    pub async fn find(&self, coffee_id: &AggregateId) -> Result<Coffee, DomainError> {
        self.repository.load(coffee_id).await
    }

    /// Loads all coffees.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Coffee>, DomainError> {
        self.repository.list_all().await
    }

    /// Changes the price of a coffee.
    #[tracing::instrument(skip(self))]
    pub async fn change_price(
        &self,
        coffee_id: &AggregateId,
        new_price: Money,
        reason: &str,
    ) -> Result<Coffee, DomainError> {
        self.repository
            .execute(coffee_id, |coffee| coffee.change_price(new_price, reason))
            .await
    }

    /// Sets the cupping score of a coffee.
    #[tracing::instrument(skip(self))]
    pub async fn set_cupping_score(
        &self,
        coffee_id: &AggregateId,
        score: i64,
    ) -> Result<Coffee, DomainError> {
        self.repository
            .execute(coffee_id, |coffee| coffee.set_cupping_score(score))
            .await
    }

    /// Replaces the details of a coffee.
    #[tracing::instrument(skip(self, details))]
    pub async fn update_details(
        &self,
        coffee_id: &AggregateId,
        details: CoffeeDetails,
    ) -> Result<Coffee, DomainError> {
        self.repository
            .execute(coffee_id, |coffee| coffee.update_details(details))
            .await
    }
}

#[cfg(test)]
mod tests {
    use event_store::InMemoryEventStore;

    use super::*;
    use crate::aggregate::Aggregate;
    use crate::coffee::CoffeeError;

    #[tokio::test]
    async fn test_create_and_find() {
        let service = CoffeeService::new(InMemoryEventStore::new());
        let created = service
            .create(NewCoffee::new("Espresso", Money::from_cents(150)).with_cupping_score(84))
            .await
            .unwrap();
        let id = created.id().cloned().unwrap();

        let found = service.find(&id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.cupping_score().map(|s| s.value()), Some(84));
    }

    #[tokio::test]
    async fn test_change_price_to_zero_is_rejected() {
        let store = InMemoryEventStore::new();
        let service = CoffeeService::new(store.clone());
        let id = service
            .create(NewCoffee::new("Espresso", Money::from_cents(150)))
            .await
            .unwrap()
            .id()
            .cloned()
            .unwrap();

        let err = service
            .change_price(&id, Money::zero(), "discount")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Coffee(CoffeeError::InvalidPrice { .. })
        ));
        assert_eq!(store.event_count().await, 1);
        assert_eq!(
            service.find(&id).await.unwrap().price(),
            Money::from_cents(150)
        );
    }

    #[tokio::test]
    async fn test_updates_survive_reload() {
        let service = CoffeeService::new(InMemoryEventStore::new());
        let id = service
            .create(NewCoffee::new("Espresso", Money::from_cents(150)))
            .await
            .unwrap()
            .id()
            .cloned()
            .unwrap();

        service
            .change_price(&id, Money::from_cents(170), "")
            .await
            .unwrap();
        service.set_cupping_score(&id, 90).await.unwrap();
        service
            .update_details(
                &id,
                CoffeeDetails {
                    origin: "Guatemala".to_string(),
                    ..CoffeeDetails::default()
                },
            )
            .await
            .unwrap();

        let coffee = service.find(&id).await.unwrap();
        assert_eq!(coffee.price(), Money::from_cents(170));
        assert_eq!(coffee.cupping_score().map(|s| s.value()), Some(90));
        assert_eq!(coffee.details().map(|d| d.origin.as_str()), Some("Guatemala"));
        assert_eq!(coffee.version().as_i64(), 4);
    }

    #[tokio::test]
    async fn test_list_all_returns_only_coffees() {
        let store = InMemoryEventStore::new();
        let service = CoffeeService::new(store.clone());
        crate::account::AccountService::new(store)
            .create("Ada")
            .await
            .unwrap();

        service
            .create(NewCoffee::new("Espresso", Money::from_cents(150)))
            .await
            .unwrap();

        let names: Vec<_> = service
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Espresso"]);
    }
}
