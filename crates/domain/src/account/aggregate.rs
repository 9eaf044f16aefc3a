//! Account aggregate implementation.

use common::{AggregateId, Money};
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{AccountError, AccountEvent};

/// Most units a single consumption may charge.
pub const MAX_CONSUME_QUANTITY: u32 = 100;

/// Account aggregate root.
///
/// The balance is the sum of all payments minus the sum of all consumption
/// costs. It may go negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    id: Option<AggregateId>,
    version: Version,
    owner: String,
    balance: Money,
    consumed_total: u64,
    uncommitted: Vec<AccountEvent>,
}

impl Aggregate for Account {
    type Event = AccountEvent;
    type Error = AccountError;

    fn aggregate_type() -> &'static str {
        "Account"
    }

    fn created_event_type() -> &'static str {
        "AccountCreated"
    }

    fn id(&self) -> Option<&AggregateId> {
        self.id.as_ref()
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn transition(&mut self, event: &AccountEvent) -> Result<(), AccountError> {
        match event {
            AccountEvent::AccountCreated(data) => {
                if self.id.is_some() || !self.owner.is_empty() {
                    return Err(AccountError::AlreadyCreated);
                }
                self.id = Some(data.account_id.clone());
                self.owner = data.owner.clone();
            }
            AccountEvent::CoffeeConsumed(data) => {
                self.ensure_created()?;
                self.balance = self.balance.checked_sub(data.price).ok_or(
                    AccountError::AmountOutOfRange {
                        amount: data.price,
                    },
                )?;
                self.consumed_total += 1;
            }
            AccountEvent::IncomingPayment(data) => {
                self.ensure_created()?;
                self.balance = self.balance.checked_add(data.amount).ok_or(
                    AccountError::AmountOutOfRange {
                        amount: data.amount,
                    },
                )?;
            }
        }
        Ok(())
    }

    fn uncommitted_buffer(&self) -> &[AccountEvent] {
        &self.uncommitted
    }

    fn uncommitted_buffer_mut(&mut self) -> &mut Vec<AccountEvent> {
        &mut self.uncommitted
    }
}

// Query methods
impl Account {
    /// Returns the owner's name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the current balance.
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Returns how many consumptions the account's history contains.
    pub fn consumed_total(&self) -> u64 {
        self.consumed_total
    }

    fn ensure_created(&self) -> Result<&AggregateId, AccountError> {
        self.id.as_ref().ok_or(AccountError::NotCreated)
    }
}

// Operations
impl Account {
    /// Opens a new account with a fresh ID.
    pub fn create(owner: impl Into<String>) -> Result<Self, AccountError> {
        Self::create_with_id(AggregateId::new(), owner)
    }

    /// Opens a new account with the given ID.
    pub fn create_with_id(
        account_id: AggregateId,
        owner: impl Into<String>,
    ) -> Result<Self, AccountError> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(AccountError::OwnerRequired);
        }

        let mut account = Self::default();
        account.apply(AccountEvent::account_created(account_id, owner))?;
        Ok(account)
    }

    /// Charges one unit of a product to the account.
    pub fn consume(&mut self, price: Money, product: impl Into<String>) -> Result<(), AccountError> {
        self.consume_n(price, product, 1)
    }

    /// Charges `quantity` units of a product, one event per unit.
    ///
    /// A quantity of zero records nothing. Quantities above
    /// [`MAX_CONSUME_QUANTITY`] and charges that would overflow the balance
    /// are rejected before any event is recorded.
    pub fn consume_n(
        &mut self,
        price: Money,
        product: impl Into<String>,
        quantity: u32,
    ) -> Result<(), AccountError> {
        let account_id = self.ensure_created()?.clone();
        if price.is_negative() {
            return Err(AccountError::NegativeAmount { amount: price });
        }
        if quantity > MAX_CONSUME_QUANTITY {
            return Err(AccountError::QuantityTooLarge {
                quantity,
                max: MAX_CONSUME_QUANTITY,
            });
        }
        price
            .checked_mul(quantity)
            .and_then(|total| self.balance.checked_sub(total))
            .ok_or(AccountError::AmountOutOfRange { amount: price })?;

        let product = product.into();
        for _ in 0..quantity {
            self.apply(AccountEvent::coffee_consumed(
                account_id.clone(),
                price,
                product.clone(),
            ))?;
        }
        Ok(())
    }

    /// Records a payment into the account.
    pub fn pay(&mut self, amount: Money, reason: impl Into<String>) -> Result<(), AccountError> {
        let account_id = self.ensure_created()?.clone();
        if amount.is_negative() {
            return Err(AccountError::NegativeAmount { amount });
        }
        if self.balance.checked_add(amount).is_none() {
            return Err(AccountError::AmountOutOfRange { amount });
        }

        self.apply(AccountEvent::incoming_payment(account_id, amount, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created_account() -> Account {
        let mut account = Account::create("Ada").unwrap();
        account.clear_uncommitted();
        account
    }

    #[test]
    fn test_create_account() {
        let account = Account::create("Ada").unwrap();

        assert!(account.id().is_some());
        assert_eq!(account.owner(), "Ada");
        assert_eq!(account.balance(), Money::zero());
        assert_eq!(account.consumed_total(), 0);
        assert_eq!(account.uncommitted_events().len(), 1);
        assert!(matches!(
            account.uncommitted_events()[0],
            AccountEvent::AccountCreated(_)
        ));
    }

    #[test]
    fn test_create_requires_owner() {
        assert!(matches!(
            Account::create(""),
            Err(AccountError::OwnerRequired)
        ));
        assert!(matches!(
            Account::create("   "),
            Err(AccountError::OwnerRequired)
        ));
    }

    #[test]
    fn test_reapplying_create_fails() {
        let mut account = created_account();
        let id = account.id().cloned().unwrap();

        let result = account.apply(AccountEvent::account_created(id, "Grace"));
        assert!(matches!(result, Err(AccountError::AlreadyCreated)));
        assert_eq!(account.owner(), "Ada");
    }

    #[test]
    fn test_pay_then_consume() {
        let mut account = created_account();
        account.pay(Money::from_cents(500), "top-up").unwrap();
        account.consume(Money::from_cents(150), "Espresso").unwrap();

        assert_eq!(account.balance(), Money::from_cents(350));
        assert_eq!(account.consumed_total(), 1);
        assert_eq!(account.uncommitted_events().len(), 2);
    }

    #[test]
    fn test_zero_amounts_are_allowed() {
        let mut account = created_account();
        account.pay(Money::zero(), "").unwrap();
        account.consume(Money::zero(), "Water").unwrap();
        assert_eq!(account.balance(), Money::zero());
    }

    #[test]
    fn test_negative_amounts_are_rejected() {
        let mut account = created_account();

        let err = account.pay(Money::from_cents(-1), "").unwrap_err();
        assert!(err.is_invalid_input());
        let err = account
            .consume(Money::from_cents(-150), "Espresso")
            .unwrap_err();
        assert!(err.is_invalid_input());

        assert!(account.uncommitted_events().is_empty());
        assert_eq!(account.balance(), Money::zero());
    }

    #[test]
    fn test_operations_require_created_account() {
        let mut account = Account::default();
        assert!(matches!(
            account.pay(Money::from_cents(100), ""),
            Err(AccountError::NotCreated)
        ));
        assert!(matches!(
            account.consume(Money::from_cents(100), "Espresso"),
            Err(AccountError::NotCreated)
        ));
    }

    #[test]
    fn test_consume_n() {
        let mut account = created_account();
        account
            .consume_n(Money::from_cents(150), "Espresso", 3)
            .unwrap();

        assert_eq!(account.balance(), Money::from_cents(-450));
        assert_eq!(account.consumed_total(), 3);
        assert_eq!(account.uncommitted_events().len(), 3);

        account.consume_n(Money::from_cents(150), "Espresso", 0).unwrap();
        assert_eq!(account.uncommitted_events().len(), 3);
    }

    #[test]
    fn test_balance_is_payments_minus_costs() {
        let mut account = created_account();
        let costs = [150, 0, 275, 99];
        let payments = [500, 1, 1000];

        for (i, cost) in costs.iter().enumerate() {
            account.consume(Money::from_cents(*cost), "x").unwrap();
            if let Some(amount) = payments.get(i) {
                account.pay(Money::from_cents(*amount), "").unwrap();
            }
        }

        let expected = payments.iter().sum::<i64>() - costs.iter().sum::<i64>();
        assert_eq!(account.balance(), Money::from_cents(expected));
    }

    #[test]
    fn test_payment_overflowing_balance_is_rejected() {
        let mut account = created_account();
        let huge = Money::from_cents(9_000_000_000_000_000_000);
        account.pay(huge, "first").unwrap();

        let err = account.pay(huge, "second").unwrap_err();
        assert!(matches!(err, AccountError::AmountOutOfRange { .. }));
        assert!(err.is_invalid_input());
        assert_eq!(account.balance(), huge);
        assert_eq!(account.uncommitted_events().len(), 1);
    }

    #[test]
    fn test_consumption_overflowing_balance_is_rejected() {
        let mut account = created_account();
        let price = Money::from_cents(i64::MAX / 2);

        let err = account.consume_n(price, "Gold", 3).unwrap_err();
        assert!(matches!(err, AccountError::AmountOutOfRange { .. }));
        assert!(account.uncommitted_events().is_empty());
        assert_eq!(account.balance(), Money::zero());
    }

    #[test]
    fn test_replaying_overflowing_payment_fails_instead_of_wrapping() {
        let mut account = created_account();
        let id = account.id().cloned().unwrap();
        let huge = Money::from_cents(i64::MAX);
        account
            .apply(AccountEvent::incoming_payment(id.clone(), huge, ""))
            .unwrap();

        let result = account.apply(AccountEvent::incoming_payment(id, huge, ""));
        assert!(matches!(result, Err(AccountError::AmountOutOfRange { .. })));
        assert_eq!(account.balance(), huge);
    }

    #[test]
    fn test_quantity_above_limit_is_rejected() {
        let mut account = created_account();

        let err = account
            .consume_n(Money::from_cents(150), "Espresso", MAX_CONSUME_QUANTITY + 1)
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::QuantityTooLarge { quantity, max }
                if quantity == MAX_CONSUME_QUANTITY + 1 && max == MAX_CONSUME_QUANTITY
        ));
        assert!(err.is_invalid_input());
        assert!(account.uncommitted_events().is_empty());

        account
            .consume_n(Money::from_cents(1), "Espresso", MAX_CONSUME_QUANTITY)
            .unwrap();
        assert_eq!(account.consumed_total(), u64::from(MAX_CONSUME_QUANTITY));
    }
}
