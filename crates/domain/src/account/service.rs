//! Account service providing a simplified API for account operations.

use common::{AggregateId, Money};
use event_store::EventStore;

use crate::error::DomainError;
use crate::repository::Repository;

use super::Account;

/// Service for managing accounts.
pub struct AccountService<S: EventStore> {
    repository: Repository<S, Account>,
}

impl<S: EventStore + Clone> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<S: EventStore> AccountService<S> {
    /// Creates a new account service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            repository: Repository::new(store),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &Repository<S, Account> {
        &self.repository
    }

    /// Opens a new account for `owner`.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, owner: &str) -> Result<Account, DomainError> {
        let account = Account::create(owner)?;
        self.repository.create(account).await
    }

    /// Loads an account by ID.
    #[tracing::instrument(skip(self))]
    pub async fn find(&self, account_id: &AggregateId) -> Result<Account, DomainError> {
        self.repository.load(account_id).await
    }

    /// Returns the IDs of all accounts.
    pub async fn list_ids(&self) -> Result<Vec<AggregateId>, DomainError> {
        self.repository.list_ids().await
    }

    /// Loads all accounts.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Account>, DomainError> {
        self.repository.list_all().await
    }

    /// Records a payment into an account.
    #[tracing::instrument(skip(self))]
    pub async fn pay(
        &self,
        account_id: &AggregateId,
        amount: Money,
        reason: &str,
    ) -> Result<Account, DomainError> {
        self.repository
            .execute(account_id, |account| account.pay(amount, reason))
            .await
    }

    /// Charges one unit of a product at `price` to an account.
    #[tracing::instrument(skip(self))]
    pub async fn consume(
        &self,
        account_id: &AggregateId,
        price: Money,
        product: &str,
    ) -> Result<Account, DomainError> {
        self.repository
            .execute(account_id, |account| account.consume(price, product))
            .await
    }
}
