pub mod distance;
pub mod grid;

pub use distance::{EARTH_RADIUS_M, distance_meters};
pub use grid::{CellKey, GridIndex};
