use crate::domain::{GeoPoint, Settlement};
use crate::geometry::distance_meters;

use super::Match;

/// Default maximum distance from a settlement's reference point
pub const DEFAULT_CITY_RADIUS_M: f64 = 10_000.0;

/// Nearest settlement to `point`, if within `radius_m`
///
/// Linear scan; on equal distances the settlement listed first wins.
pub fn resolve_city(point: GeoPoint, settlements: &[Settlement], radius_m: f64) -> Match {
    let mut best: Option<(&Settlement, f64)> = None;

    for settlement in settlements {
        let d = distance_meters(point, settlement.location);
        if best.is_none_or(|(_, min)| d < min) {
            best = Some((settlement, d));
        }
    }

    match best {
        Some((settlement, d)) => Match {
            name: (d <= radius_m).then(|| settlement.name.clone()),
            distance_m: d,
        },
        None => Match::none(),
    }
}

/// Settlement reference set with a fixed match radius
#[derive(Debug, Clone)]
pub struct CityResolver {
    settlements: Vec<Settlement>,
    radius_m: f64,
}

impl CityResolver {
    pub fn new(settlements: Vec<Settlement>, radius_m: f64) -> Self {
        Self {
            settlements,
            radius_m,
        }
    }

    pub fn resolve(&self, point: GeoPoint) -> Match {
        resolve_city(point, &self.settlements, self.radius_m)
    }

    pub fn len(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }
}
