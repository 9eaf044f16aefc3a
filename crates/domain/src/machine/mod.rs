//! Machine aggregate: a vending machine and the coffee loaded into it.

mod aggregate;
mod events;
mod service;

pub use aggregate::Machine;
pub use events::{CoffeeLoadedData, MachineCreatedData, MachineEvent};
pub use service::MachineService;

use thiserror::Error;

use crate::aggregate::AggregateMismatch;

/// Errors that can occur during machine operations.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("Machine brand is required")]
    BrandRequired,

    #[error("Machine model is required")]
    ModelRequired,

    /// No coffee has been loaded yet.
    #[error("No coffee loaded")]
    NotLoaded,

    #[error("Machine already created")]
    AlreadyCreated,

    #[error("Machine not created")]
    NotCreated,

    #[error(transparent)]
    Mismatch(#[from] AggregateMismatch),
}

impl MachineError {
    /// Returns true for errors caused by invalid caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, MachineError::BrandRequired | MachineError::ModelRequired)
    }
}
