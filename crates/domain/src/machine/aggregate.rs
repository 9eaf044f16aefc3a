//! Machine aggregate implementation.

use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{MachineError, MachineEvent};

/// Machine aggregate root.
///
/// Brand and model are fixed at creation. The loaded coffee is absent until
/// the first load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Machine {
    id: Option<AggregateId>,
    version: Version,
    brand: String,
    model: String,
    loaded_coffee: Option<AggregateId>,
    uncommitted: Vec<MachineEvent>,
}

impl Aggregate for Machine {
    type Event = MachineEvent;
    type Error = MachineError;

    fn aggregate_type() -> &'static str {
        "Machine"
    }

    fn created_event_type() -> &'static str {
        "MachineCreated"
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

    fn transition(&mut self, event: &MachineEvent) -> Result<(), MachineError> {
        match event {
            MachineEvent::MachineCreated(data) => {
                if self.id.is_some() {
                    return Err(MachineError::AlreadyCreated);
                }
                self.id = Some(data.machine_id.clone());
                self.brand = data.brand.clone();
                self.model = data.model.clone();
            }
            MachineEvent::CoffeeLoaded(data) => {
                self.ensure_created()?;
                self.loaded_coffee = Some(data.coffee_id.clone());
            }
        }
        Ok(())
    }

    fn uncommitted_buffer(&self) -> &[MachineEvent] {
        &self.uncommitted
    }

    fn uncommitted_buffer_mut(&mut self) -> &mut Vec<MachineEvent> {
        &mut self.uncommitted
    }
}

impl Machine {
    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the loaded coffee, if any.
    pub fn loaded_coffee(&self) -> Option<&AggregateId> {
        self.loaded_coffee.as_ref()
    }

    /// Returns the loaded coffee or `NotLoaded`.
    pub fn current_coffee(&self) -> Result<&AggregateId, MachineError> {
        self.loaded_coffee.as_ref().ok_or(MachineError::NotLoaded)
    }

    fn ensure_created(&self) -> Result<&AggregateId, MachineError> {
        self.id.as_ref().ok_or(MachineError::NotCreated)
    }

    /// Installs a new machine with a fresh ID.
    pub fn create(brand: impl Into<String>, model: impl Into<String>) -> Result<Self, MachineError> {
        Self::create_with_id(AggregateId::new(), brand, model)
    }

    pub fn create_with_id(
        machine_id: AggregateId,
        brand: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, MachineError> {
        let (brand, model) = (brand.into(), model.into());
        if brand.trim().is_empty() {
            return Err(MachineError::BrandRequired);
        }
        if model.trim().is_empty() {
            return Err(MachineError::ModelRequired);
        }

        let mut machine = Self::default();
        machine.apply(MachineEvent::machine_created(machine_id, brand, model))?;
        Ok(machine)
    }

    /// Loads a coffee, replacing the previous one.
    pub fn load_coffee(&mut self, coffee_id: AggregateId) -> Result<(), MachineError> {
        let machine_id = self.ensure_created()?.clone();
        self.apply(MachineEvent::coffee_loaded(machine_id, coffee_id))
    }
}
