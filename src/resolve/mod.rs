//! Nearest-neighbor matchers for settlements and streets

pub mod city;
pub mod street;

pub use city::{CityResolver, resolve_city};
pub use street::{StreetResolver, resolve_street};

/// Outcome of a nearest-neighbor lookup
///
/// `name` is `None` when nothing lies within the match radius; `distance_m`
/// is the distance to the closest candidate seen, or infinity if there was none.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub name: Option<String>,
    pub distance_m: f64,
}

impl Match {
    pub fn none() -> Self {
        Self {
            name: None,
            distance_m: f64::INFINITY,
        }
    }

    pub fn is_match(&self) -> bool {
        self.name.is_some()
    }
}
