//! Domain layer for the coffy event-sourcing system.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits, with a single generic replay
//! - A repository that persists recorded events under a per-aggregate lock
//! - The Account, Coffee and Machine aggregates with their services
//! - The consume workflow that charges accounts for coffees

pub mod account;
pub mod aggregate;
pub mod coffee;
pub mod consume;
pub mod error;
pub mod lock;
pub mod machine;
pub mod replay;
pub mod repository;

pub use account::{Account, AccountError, AccountEvent, AccountService, MAX_CONSUME_QUANTITY};
pub use aggregate::{Aggregate, AggregateMismatch, DomainEvent};
pub use coffee::{
    Coffee, CoffeeDetails, CoffeeError, CoffeeEvent, CoffeeService, CuppingScore, NewCoffee,
};
pub use consume::{ConsumeError, ConsumeService, RECEIPT_RECIPIENT, Receipt};
pub use error::DomainError;
pub use lock::AggregateLocks;
pub use machine::{Machine, MachineError, MachineEvent, MachineService};
pub use replay::{encode_events, replay};
pub use repository::Repository;
