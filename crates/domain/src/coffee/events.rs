//! Coffee domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{CoffeeDetails, CuppingScore};

/// Events that can occur on a coffee aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CoffeeEvent {
    /// Coffee was added to the assortment.
    CoffeeCreated(CoffeeCreatedData),

    /// Coffee price changed.
    PriceUpdated(PriceUpdatedData),

    /// Coffee was given a cupping score.
    CuppingScoreProvided(CuppingScoreProvidedData),

    /// Coffee description was replaced.
    DetailsUpdated(DetailsUpdatedData),
}

impl DomainEvent for CoffeeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CoffeeEvent::CoffeeCreated(_) => "CoffeeCreated",
            CoffeeEvent::PriceUpdated(_) => "PriceUpdated",
            CoffeeEvent::CuppingScoreProvided(_) => "CuppingScoreProvided",
            CoffeeEvent::DetailsUpdated(_) => "DetailsUpdated",
        }
    }

    fn aggregate_id(&self) -> &AggregateId {
        match self {
            CoffeeEvent::CoffeeCreated(data) => &data.coffee_id,
            CoffeeEvent::PriceUpdated(data) => &data.coffee_id,
            CoffeeEvent::CuppingScoreProvided(data) => &data.coffee_id,
            CoffeeEvent::DetailsUpdated(data) => &data.coffee_id,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            CoffeeEvent::CoffeeCreated(data) => data.occurred_on,
            CoffeeEvent::PriceUpdated(data) => data.occurred_on,
            CoffeeEvent::CuppingScoreProvided(data) => data.occurred_on,
            CoffeeEvent::DetailsUpdated(data) => data.occurred_on,
        }
    }

    fn event_types() -> &'static [&'static str] {
        &[
            "CoffeeCreated",
            "PriceUpdated",
            "CuppingScoreProvided",
            "DetailsUpdated",
        ]
    }
}

/// Data for CoffeeCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeCreatedData {
    /// The unique coffee ID.
    pub coffee_id: AggregateId,

    /// Product name (e.g. "Espresso").
    pub name: String,

    /// Initial price per unit.
    pub price: Money,

    pub occurred_on: DateTime<Utc>,
}

/// Data for PriceUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdatedData {
    pub coffee_id: AggregateId,

    /// New price per unit.
    pub price: Money,

    /// Why the price changed.
    pub reason: String,

    pub occurred_on: DateTime<Utc>,
}

/// Data for CuppingScoreProvided event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuppingScoreProvidedData {
    pub coffee_id: AggregateId,
    pub score: CuppingScore,
    pub occurred_on: DateTime<Utc>,
}

/// Data for DetailsUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsUpdatedData {
    pub coffee_id: AggregateId,
    pub details: CoffeeDetails,
    pub occurred_on: DateTime<Utc>,
}

// Convenience constructors
impl CoffeeEvent {
    pub fn coffee_created(coffee_id: AggregateId, name: impl Into<String>, price: Money) -> Self {
        CoffeeEvent::CoffeeCreated(CoffeeCreatedData {
            coffee_id,
            name: name.into(),
            price,
            occurred_on: Utc::now(),
        })
    }

    pub fn price_updated(coffee_id: AggregateId, price: Money, reason: impl Into<String>) -> Self {
        CoffeeEvent::PriceUpdated(PriceUpdatedData {
            coffee_id,
            price,
            reason: reason.into(),
            occurred_on: Utc::now(),
        })
    }

    pub fn cupping_score_provided(coffee_id: AggregateId, score: CuppingScore) -> Self {
        CoffeeEvent::CuppingScoreProvided(CuppingScoreProvidedData {
            coffee_id,
            score,
            occurred_on: Utc::now(),
        })
    }

    pub fn details_updated(coffee_id: AggregateId, details: CoffeeDetails) -> Self {
        CoffeeEvent::DetailsUpdated(DetailsUpdatedData {
            coffee_id,
            details,
            occurred_on: Utc::now(),
        })
    }
}
