//! Coffee aggregate implementation.

use common::{AggregateId, Money};
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{CoffeeDetails, CoffeeError, CoffeeEvent, CuppingScore};

/// Input for creating a coffee.
#[derive(Debug, Clone, Default)]
pub struct NewCoffee {
    pub name: String,
    pub price: Money,
    pub cupping_score: Option<i64>,
    pub details: Option<CoffeeDetails>,
}

impl NewCoffee {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_cupping_score(mut self, score: i64) -> Self {
        self.cupping_score = Some(score);
        self
    }

    pub fn with_details(mut self, details: CoffeeDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// Coffee aggregate root: one sellable product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coffee {
    id: Option<AggregateId>,
    version: Version,
    name: String,
    price: Money,
    cupping_score: Option<CuppingScore>,
    details: Option<CoffeeDetails>,
    uncommitted: Vec<CoffeeEvent>,
}

impl Aggregate for Coffee {
    type Event = CoffeeEvent;
    type Error = CoffeeError;

    fn aggregate_type() -> &'static str {
        "Coffee"
    }

    fn created_event_type() -> &'static str {
        "CoffeeCreated"
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

    fn transition(&mut self, event: &CoffeeEvent) -> Result<(), CoffeeError> {
        match event {
            CoffeeEvent::CoffeeCreated(data) => {
                if self.id.is_some() {
                    return Err(CoffeeError::AlreadyCreated);
                }
                validate_name(&data.name)?;
                validate_price(data.price)?;
                self.id = Some(data.coffee_id.clone());
                self.name = data.name.clone();
                self.price = data.price;
            }
            CoffeeEvent::PriceUpdated(data) => {
                self.ensure_created()?;
                self.price = validate_price(data.price)?;
            }
            CoffeeEvent::CuppingScoreProvided(data) => {
                self.ensure_created()?;
                self.cupping_score = Some(data.score.validate()?);
            }
            CoffeeEvent::DetailsUpdated(data) => {
                self.ensure_created()?;
                self.details = Some(data.details.clone());
            }
        }
        Ok(())
    }

    fn uncommitted_buffer(&self) -> &[CoffeeEvent] {
        &self.uncommitted
    }

    fn uncommitted_buffer_mut(&mut self) -> &mut Vec<CoffeeEvent> {
        &mut self.uncommitted
    }
}

fn validate_name(name: &str) -> Result<(), CoffeeError> {
    if name.trim().is_empty() {
        return Err(CoffeeError::NameRequired);
    }
    Ok(())
}

fn validate_price(price: Money) -> Result<Money, CoffeeError> {
    if !price.is_positive() {
        return Err(CoffeeError::InvalidPrice { price });
    }
    Ok(price)
}

// Query methods
impl Coffee {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current price per unit.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn cupping_score(&self) -> Option<CuppingScore> {
        self.cupping_score
    }

    pub fn details(&self) -> Option<&CoffeeDetails> {
        self.details.as_ref()
    }

    fn ensure_created(&self) -> Result<&AggregateId, CoffeeError> {
        self.id.as_ref().ok_or(CoffeeError::NotCreated)
    }
}

// Operations
impl Coffee {
    /// Creates a new coffee with a fresh ID.
    ///
    /// All input is validated before the first event is recorded, so a bad
    /// score or price never leaves a half-built coffee behind.
    pub fn create(new: NewCoffee) -> Result<Self, CoffeeError> {
        Self::create_with_id(AggregateId::new(), new)
    }

    /// Creates a new coffee with the given ID.
    pub fn create_with_id(coffee_id: AggregateId, new: NewCoffee) -> Result<Self, CoffeeError> {
        validate_name(&new.name)?;
        validate_price(new.price)?;
        let score = new.cupping_score.map(CuppingScore::new).transpose()?;

        let mut coffee = Self::default();
        coffee.apply(CoffeeEvent::coffee_created(
            coffee_id.clone(),
            new.name,
            new.price,
        ))?;
        if let Some(score) = score {
            coffee.apply(CoffeeEvent::cupping_score_provided(coffee_id.clone(), score))?;
        }
        if let Some(details) = new.details {
            coffee.apply(CoffeeEvent::details_updated(coffee_id, details))?;
        }
        Ok(coffee)
    }

    /// Changes the price. The new price must be greater than zero.
    pub fn change_price(
        &mut self,
        new_price: Money,
        reason: impl Into<String>,
    ) -> Result<(), CoffeeError> {
        let coffee_id = self.ensure_created()?.clone();
        validate_price(new_price)?;

        self.apply(CoffeeEvent::price_updated(coffee_id, new_price, reason))
    }

    /// Sets the cupping score.
    pub fn set_cupping_score(&mut self, value: i64) -> Result<(), CoffeeError> {
        let coffee_id = self.ensure_created()?.clone();
        let score = CuppingScore::new(value)?;

        self.apply(CoffeeEvent::cupping_score_provided(coffee_id, score))
    }

    /// Replaces the details wholesale.
    pub fn update_details(&mut self, details: CoffeeDetails) -> Result<(), CoffeeError> {
        let coffee_id = self.ensure_created()?.clone();

        self.apply(CoffeeEvent::details_updated(coffee_id, details))
    }
}
