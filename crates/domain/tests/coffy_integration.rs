//! Integration tests for the coffy domain.
//!
//! These tests drive the services against a real event store and check the
//! stored history, replay and the consume workflow end to end.

use chrono::Utc;
use common::{AggregateId, Money};
use domain::{
    Account, AccountEvent, AccountService, Aggregate, CoffeeDetails, CoffeeError, CoffeeEvent,
    CoffeeService, ConsumeError, ConsumeService, DomainError, DomainEvent, MachineError,
    MachineService, NewCoffee, encode_events, replay,
};
use event_store::{
    AppendOptions, EventStore, InMemoryEventStore, NewEventEntry, SqliteEventStore, Version,
};

struct Services<S: EventStore + Clone> {
    store: S,
    accounts: AccountService<S>,
    coffees: CoffeeService<S>,
    machines: MachineService<S>,
    consume: ConsumeService<S>,
}

fn services<S: EventStore + Clone>(store: S) -> Services<S> {
    let accounts = AccountService::new(store.clone());
    let coffees = CoffeeService::new(store.clone());
    Services {
        machines: MachineService::new(store.clone()),
        consume: ConsumeService::new(accounts.clone(), coffees.clone()),
        store,
        accounts,
        coffees,
    }
}

fn id_of<A: Aggregate>(aggregate: &A) -> AggregateId {
    aggregate.id().cloned().unwrap()
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn create_account() {
        let s = services(InMemoryEventStore::new());
        let account = s.accounts.create("Ada").await.unwrap();

        assert_eq!(account.owner(), "Ada");
        assert_eq!(account.balance(), Money::zero());

        let history = s.store.load_all(&id_of(&account)).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type, "AccountCreated");
    }

    #[tokio::test]
    async fn consume_espresso_twice() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());
        let coffee_id = id_of(
            &s.coffees
                .create(NewCoffee::new("Espresso", Money::from_decimal(1.50).unwrap()))
                .await
                .unwrap(),
        );

        s.consume.consume(&account_id, &coffee_id, 1).await.unwrap();
        s.consume.consume(&account_id, &coffee_id, 1).await.unwrap();

        let account = s.accounts.find(&account_id).await.unwrap();
        assert_eq!(account.balance().to_string(), "-3.00");
        assert_eq!(account.consumed_total(), 2);
    }

    #[tokio::test]
    async fn pay_then_consume() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());

        s.accounts
            .pay(&account_id, Money::from_decimal(5.00).unwrap(), "top-up")
            .await
            .unwrap();
        s.accounts
            .consume(&account_id, Money::from_decimal(1.50).unwrap(), "Espresso")
            .await
            .unwrap();

        let account = s.accounts.find(&account_id).await.unwrap();
        assert_eq!(account.balance(), Money::from_cents(350));
    }

    #[tokio::test]
    async fn change_price_to_zero_is_rejected() {
        let s = services(InMemoryEventStore::new());
        let coffee_id = id_of(
            &s.coffees
                .create(NewCoffee::new("Espresso", Money::from_cents(150)))
                .await
                .unwrap(),
        );

        let err = s
            .coffees
            .change_price(&coffee_id, Money::zero(), "discount")
            .await
            .unwrap_err();

        assert!(err.is_invalid_input());
        assert!(matches!(
            err,
            DomainError::Coffee(CoffeeError::InvalidPrice { .. })
        ));
    }

    #[tokio::test]
    async fn machine_load_and_current_coffee() {
        let s = services(InMemoryEventStore::new());

        let loaded = id_of(&s.machines.create("Jura", "E8").await.unwrap());
        s.machines
            .load_coffee(&loaded, &AggregateId::from("c1"))
            .await
            .unwrap();
        let machine = s.machines.find(&loaded).await.unwrap();
        assert_eq!(machine.current_coffee().unwrap(), &AggregateId::from("c1"));

        let empty = id_of(&s.machines.create("Jura", "E8").await.unwrap());
        let machine = s.machines.find(&empty).await.unwrap();
        assert!(matches!(
            machine.current_coffee(),
            Err(MachineError::NotLoaded)
        ));
    }
}

mod properties {
    use super::*;

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let s = services(InMemoryEventStore::new());
        let unknown = AggregateId::from("unknown-id");

        assert!(matches!(
            s.accounts.find(&unknown).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            s.coffees.find(&unknown).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            s.machines.find(&unknown).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn cupping_score_boundaries() {
        let s = services(InMemoryEventStore::new());
        let coffee_id = id_of(
            &s.coffees
                .create(NewCoffee::new("Filter", Money::from_cents(200)))
                .await
                .unwrap(),
        );

        for accepted in [58, 100] {
            s.coffees.set_cupping_score(&coffee_id, accepted).await.unwrap();
        }
        for rejected in [57, 101] {
            let err = s
                .coffees
                .set_cupping_score(&coffee_id, rejected)
                .await
                .unwrap_err();
            assert!(err.is_invalid_input());
        }

        let coffee = s.coffees.find(&coffee_id).await.unwrap();
        assert_eq!(coffee.cupping_score().map(|s| s.value()), Some(100));
    }

    #[tokio::test]
    async fn balance_equals_payments_minus_costs() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());

        let costs = [150, 275, 0, 320, 99];
        let payments = [1000, 1, 450];
        for step in 0..costs.len().max(payments.len()) {
            if let Some(amount) = payments.get(step) {
                s.accounts
                    .pay(&account_id, Money::from_cents(*amount), "")
                    .await
                    .unwrap();
            }
            if let Some(cost) = costs.get(step) {
                s.accounts
                    .consume(&account_id, Money::from_cents(*cost), "x")
                    .await
                    .unwrap();
            }
        }

        let account = s.accounts.find(&account_id).await.unwrap();
        let expected = payments.iter().sum::<i64>() - costs.iter().sum::<i64>();
        assert_eq!(account.balance(), Money::from_cents(expected));
        assert_eq!(account.consumed_total(), costs.len() as u64);
    }

    #[tokio::test]
    async fn replay_of_stored_history_is_deterministic() {
        let s = services(InMemoryEventStore::new());
        let coffee_id = id_of(
            &s.coffees
                .create(
                    NewCoffee::new("Espresso", Money::from_cents(150))
                        .with_cupping_score(82)
                        .with_details(CoffeeDetails {
                            origin: "Ethiopia".to_string(),
                            ..CoffeeDetails::default()
                        }),
                )
                .await
                .unwrap(),
        );
        s.coffees
            .change_price(&coffee_id, Money::from_cents(500), "")
            .await
            .unwrap();
        s.coffees
            .change_price(&coffee_id, Money::from_cents(800), "")
            .await
            .unwrap();

        let history = s.store.load_all(&coffee_id).await.unwrap();
        let first: domain::Coffee = replay(&coffee_id, &history).unwrap();
        let second: domain::Coffee = replay(&coffee_id, &history).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.price(), Money::from_cents(800));
        assert_eq!(first.version(), Version::new(5));
    }

    #[tokio::test]
    async fn injected_foreign_event_corrupts_history() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());

        // Row filed under this account but carrying another account's event
        let foreign = AccountEvent::incoming_payment(
            AggregateId::from("someone-else"),
            Money::from_cents(10_000),
            "",
        );
        let payload = serde_json::to_vec(&foreign).unwrap();
        s.store
            .append(
                vec![NewEventEntry::new(
                    account_id.clone(),
                    foreign.event_type(),
                    Utc::now(),
                    payload,
                )],
                AppendOptions::new(),
            )
            .await
            .unwrap();

        assert!(matches!(
            s.accounts.find(&account_id).await,
            Err(DomainError::CorruptHistory { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_event_tag_aborts_replay() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());

        s.store
            .append(
                vec![NewEventEntry::new(
                    account_id.clone(),
                    "AccountClosed",
                    Utc::now(),
                    b"{}".to_vec(),
                )],
                AppendOptions::new(),
            )
            .await
            .unwrap();

        assert!(matches!(
            s.accounts.find(&account_id).await,
            Err(DomainError::UnknownEventType { .. })
        ));
    }

    #[test]
    fn every_event_kind_roundtrips_through_store_rows() {
        let account = AggregateId::from("a1");
        let coffee = AggregateId::from("c1");

        let account_events = vec![
            AccountEvent::account_created(account.clone(), "Ada"),
            AccountEvent::coffee_consumed(account.clone(), Money::from_cents(150), "Espresso"),
            AccountEvent::incoming_payment(account, Money::from_cents(500), "top-up"),
        ];
        for (row, event) in encode_events(&account_events)
            .unwrap()
            .iter()
            .zip(&account_events)
        {
            let decoded: AccountEvent = serde_json::from_slice(&row.payload).unwrap();
            assert_eq!(&decoded, event);
            assert_eq!(row.occurred_on, event.occurred_on());
        }

        let coffee_events = vec![
            CoffeeEvent::coffee_created(coffee.clone(), "Espresso", Money::from_cents(150)),
            CoffeeEvent::price_updated(coffee, Money::from_cents(180), "beans"),
        ];
        for (row, event) in encode_events(&coffee_events)
            .unwrap()
            .iter()
            .zip(&coffee_events)
        {
            let decoded: CoffeeEvent = serde_json::from_slice(&row.payload).unwrap();
            assert_eq!(&decoded, event);
        }
    }
}

mod consume_workflow {
    use super::*;

    #[tokio::test]
    async fn quantity_is_one_batch_at_current_price() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());
        let coffee_id = id_of(
            &s.coffees
                .create(NewCoffee::new("Cappuccino", Money::from_cents(250)))
                .await
                .unwrap(),
        );

        let receipt = s.consume.consume(&account_id, &coffee_id, 3).await.unwrap();
        assert_eq!(receipt.amount, Money::from_cents(750));
        assert_eq!(receipt.submitter, "Ada");
        assert_eq!(receipt.purpose, "consumption of 'Cappuccino'");

        let history = s.store.load_all(&account_id).await.unwrap();
        assert_eq!(history.len(), 4);
        assert!(
            history[1..]
                .iter()
                .all(|e| e.event_type == "CoffeeConsumed")
        );
    }

    #[tokio::test]
    async fn missing_account_is_reported_first() {
        let s = services(InMemoryEventStore::new());
        let err = s
            .consume
            .consume(
                &AggregateId::from("no-account"),
                &AggregateId::from("no-coffee"),
                1,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConsumeError::AccountNotFound(id) if id.as_str() == "no-account"));
    }

    #[tokio::test]
    async fn concurrent_consumptions_are_all_counted() {
        let s = services(InMemoryEventStore::new());
        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());
        let coffee_id = id_of(
            &s.coffees
                .create(NewCoffee::new("Espresso", Money::from_cents(150)))
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..20 {
            let consume = s.consume.clone();
            let (account_id, coffee_id) = (account_id.clone(), coffee_id.clone());
            handles.push(tokio::spawn(async move {
                consume.consume(&account_id, &coffee_id, 1).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let account = s.accounts.find(&account_id).await.unwrap();
        assert_eq!(account.consumed_total(), 20);
        assert_eq!(account.balance(), Money::from_cents(-3000));
    }
}

mod sqlite_backend {
    use super::*;

    #[tokio::test]
    async fn services_work_on_sqlite() {
        let store = SqliteEventStore::connect("sqlite::memory:").await.unwrap();
        let s = services(store);

        let account_id = id_of(&s.accounts.create("Ada").await.unwrap());
        let coffee_id = id_of(
            &s.coffees
                .create(NewCoffee::new("Espresso", Money::from_cents(150)))
                .await
                .unwrap(),
        );
        s.accounts
            .pay(&account_id, Money::from_cents(1000), "top-up")
            .await
            .unwrap();
        s.consume.consume(&account_id, &coffee_id, 2).await.unwrap();

        let account: Account = s.accounts.find(&account_id).await.unwrap();
        assert_eq!(account.balance(), Money::from_cents(700));
        assert_eq!(account.version(), Version::new(4));

        let ids = s.accounts.list_ids().await.unwrap();
        assert_eq!(ids, vec![account_id]);
    }
}
