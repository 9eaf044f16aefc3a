//! Machine domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a machine aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MachineEvent {
    /// Machine was installed.
    MachineCreated(MachineCreatedData),

    /// A coffee was loaded, replacing any previous one.
    CoffeeLoaded(CoffeeLoadedData),
}

impl DomainEvent for MachineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MachineEvent::MachineCreated(_) => "MachineCreated",
            MachineEvent::CoffeeLoaded(_) => "CoffeeLoaded",
        }
    }

    fn aggregate_id(&self) -> &AggregateId {
        match self {
            MachineEvent::MachineCreated(data) => &data.machine_id,
            MachineEvent::CoffeeLoaded(data) => &data.machine_id,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            MachineEvent::MachineCreated(data) => data.occurred_on,
            MachineEvent::CoffeeLoaded(data) => data.occurred_on,
        }
    }

    fn event_types() -> &'static [&'static str] {
        &["MachineCreated", "CoffeeLoaded"]
    }
}

/// Data for MachineCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineCreatedData {
    pub machine_id: AggregateId,
    pub brand: String,
    pub model: String,
    pub occurred_on: DateTime<Utc>,
}

/// Data for CoffeeLoaded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeLoadedData {
    pub machine_id: AggregateId,

    /// The coffee now in the machine.
    pub coffee_id: AggregateId,

    pub occurred_on: DateTime<Utc>,
}

impl MachineEvent {
    pub fn machine_created(
        machine_id: AggregateId,
        brand: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        MachineEvent::MachineCreated(MachineCreatedData {
            machine_id,
            brand: brand.into(),
            model: model.into(),
            occurred_on: Utc::now(),
        })
    }

    pub fn coffee_loaded(machine_id: AggregateId, coffee_id: AggregateId) -> Self {
        MachineEvent::CoffeeLoaded(CoffeeLoadedData {
            machine_id,
            coffee_id,
            occurred_on: Utc::now(),
        })
    }
}
