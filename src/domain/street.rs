use super::GeoPoint;

/// One contiguous polyline of a street (an OSM way)
///
/// A street can be split over several segments; they are never merged.
#[derive(Debug, Clone)]
pub struct StreetSegment {
    pub name: Option<String>,
    /// Ordered vertices, at least one
    pub vertices: Vec<GeoPoint>,
}

impl StreetSegment {
    /// Returns `None` when `vertices` is empty
    pub fn new(name: Option<String>, vertices: Vec<GeoPoint>) -> Option<Self> {
        if vertices.is_empty() {
            return None;
        }
        Some(Self { name, vertices })
    }

    /// The vertex the segment is indexed by
    pub fn first_vertex(&self) -> Option<GeoPoint> {
        self.vertices.first().copied()
    }
}
