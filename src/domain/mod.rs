pub mod poi;
pub mod point;
pub mod settlement;
pub mod street;

pub use poi::{Category, EnrichedPoi, RawPoi};
pub use point::GeoPoint;
pub use settlement::Settlement;
pub use street::StreetSegment;
