use crate::domain::GeoPoint;
use crate::geometry::{GridIndex, distance_meters};

use super::Match;

/// Default maximum distance from the nearest street vertex
pub const DEFAULT_STREET_RADIUS_M: f64 = 100.0;

/// Name of the street whose closest vertex is within `radius_m` of `point`
///
/// # Algorithm
/// 1. Take the candidate segments of the 3x3 cell block around `point`
/// 2. Measure every vertex of every candidate, keeping the single closest one
/// 3. Return that vertex's segment name if it is within `radius_m`
///
/// A nameless closest segment yields no name.
pub fn resolve_street(point: GeoPoint, index: &GridIndex, radius_m: f64) -> Match {
    let mut best: Option<(Option<&str>, f64)> = None;

    for segment in index.query(point) {
        for &vertex in &segment.vertices {
            let d = distance_meters(point, vertex);
            if best.is_none_or(|(_, min)| d < min) {
                best = Some((segment.name.as_deref(), d));
            }
        }
    }

    match best {
        Some((name, d)) => Match {
            name: name.filter(|_| d <= radius_m).map(str::to_string),
            distance_m: d,
        },
        None => Match::none(),
    }
}

/// Street grid with a fixed match radius
#[derive(Debug, Clone)]
pub struct StreetResolver {
    index: GridIndex,
    radius_m: f64,
}

impl StreetResolver {
    pub fn new(index: GridIndex, radius_m: f64) -> Self {
        Self { index, radius_m }
    }

    pub fn resolve(&self, point: GeoPoint) -> Match {
        resolve_street(point, &self.index, self.radius_m)
    }
}
