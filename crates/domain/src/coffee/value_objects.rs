//! Value objects for the coffee domain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CoffeeError;

/// Standardized quality score of a coffee, from 58 to 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuppingScore(u8);

impl CuppingScore {
    pub const MIN: u8 = 58;
    pub const MAX: u8 = 100;

    /// Creates a score, rejecting values outside the scale.
    pub fn new(value: i64) -> Result<Self, CoffeeError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CoffeeError::InvalidCuppingScore { score: value })
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Re-checks a score that was decoded from storage.
    pub(crate) fn validate(&self) -> Result<Self, CoffeeError> {
        Self::new(i64::from(self.0))
    }
}

impl std::fmt::Display for CuppingScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured description of a coffee.
///
/// Always replaced as a whole, never merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeDetails {
    /// Where the beans come from.
    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub description: String,

    /// Who roasted the beans.
    #[serde(default)]
    pub roast_house: String,

    /// Any further attributes.
    #[serde(default)]
    pub misc: BTreeMap<String, String>,
}
