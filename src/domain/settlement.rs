use super::GeoPoint;

/// A named populated place represented by a single reference point
#[derive(Debug, Clone)]
pub struct Settlement {
    pub name: String,
    pub location: GeoPoint,
}

impl Settlement {
    pub fn new(name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}
