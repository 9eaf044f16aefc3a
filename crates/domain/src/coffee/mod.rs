//! Coffee product aggregate and related types.

mod aggregate;
mod events;
mod service;
mod value_objects;

pub use aggregate::{Coffee, NewCoffee};
pub use events::{
    CoffeeCreatedData, CoffeeEvent, CuppingScoreProvidedData, DetailsUpdatedData,
    PriceUpdatedData,
};
pub use service::CoffeeService;
pub use value_objects::{CoffeeDetails, CuppingScore};

use common::Money;
use thiserror::Error;

use crate::aggregate::AggregateMismatch;

/// Errors that can occur during coffee operations.
#[derive(Debug, Error)]
pub enum CoffeeError {
    /// Name is required.
    #[error("Coffee name is required")]
    NameRequired,

    /// Invalid price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: Money },

    /// Cupping score outside the scale.
    #[error(
        "Invalid cupping score: {score} (must be between {min} and {max})",
        min = CuppingScore::MIN,
        max = CuppingScore::MAX
    )]
    InvalidCuppingScore { score: i64 },

    /// Coffee is already created.
    #[error("Coffee already created")]
    AlreadyCreated,

    /// Operation on a coffee that was never created.
    #[error("Coffee not created")]
    NotCreated,

    #[error(transparent)]
    Mismatch(#[from] AggregateMismatch),
}

impl CoffeeError {
    /// Returns true for errors caused by invalid caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CoffeeError::NameRequired
                | CoffeeError::InvalidPrice { .. }
                | CoffeeError::InvalidCuppingScore { .. }
        )
    }
}
