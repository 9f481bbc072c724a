pub mod local;
pub mod overpass;

pub use local::{load_dataset, save_dataset};
pub use overpass::{Element, LatLon, OverpassResponse, fetch_dataset};

use std::fmt;

/// The three raw inputs of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Pois,
    Streets,
    Settlements,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Pois => "pois",
            Dataset::Streets => "streets",
            Dataset::Settlements => "settlements",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
