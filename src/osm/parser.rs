use geo::{Centroid, LineString};
use std::collections::HashMap;
use tracing::debug;

use crate::api::{Element, LatLon, OverpassResponse};
use crate::domain::{GeoPoint, RawPoi, Settlement, StreetSegment};

/// POIs parsed from a response plus the number of elements rejected
#[derive(Debug, Default)]
pub struct ParsedPois {
    pub pois: Vec<RawPoi>,
    pub skipped: usize,
}

/// `name:{language}` if present, else `name`; empty values count as absent
pub fn preferred_name<'a>(tags: &'a HashMap<String, String>, language: Option<&str>) -> Option<&'a str> {
    let non_empty = move |key: &str| tags.get(key).map(String::as_str).filter(|v| !v.trim().is_empty());

    language
        .and_then(|lang| non_empty(&format!("name:{lang}")))
        .or_else(|| non_empty("name"))
}

/// Parse Overpass POI elements (nodes and ways) into raw POIs
///
/// # Algorithm
/// For each element with tags:
/// - Take the preferred name, skipping unnamed features
/// - Locate it by `lat`/`lon`, else `center`, else the centroid of `geometry`
/// - Keep every tag for later classification and address lookup
pub fn parse_pois(response: &OverpassResponse, language: Option<&str>) -> ParsedPois {
    let mut parsed = ParsedPois::default();

    for element in &response.elements {
        let Some(tags) = &element.tags else {
            debug!(id = element.id, "Skipping POI without tags");
            parsed.skipped += 1;
            continue;
        };

        let Some(name) = preferred_name(tags, language) else {
            debug!(id = element.id, "Skipping unnamed POI");
            parsed.skipped += 1;
            continue;
        };

        let Some(location) = element_location(element) else {
            debug!(id = element.id, name, "Skipping POI without coordinates");
            parsed.skipped += 1;
            continue;
        };

        parsed
            .pois
            .push(RawPoi::new(name, location, tags.clone()));
    }

    parsed
}

/// Parse `place=*` nodes into settlements; unnamed or unlocated places are dropped
pub fn parse_settlements(response: &OverpassResponse, language: Option<&str>) -> Vec<Settlement> {
    response
        .elements
        .iter()
        .filter(|e| e.type_ == "node")
        .filter_map(|e| {
            let name = preferred_name(e.tags.as_ref()?, language)?;
            let location = GeoPoint::new(e.lat?, e.lon?);
            location
                .is_finite()
                .then(|| Settlement::new(name, location))
        })
        .collect()
}

/// Parse `out geom` ways into street segments
///
/// Names are optional; ways without a single usable vertex are dropped.
pub fn parse_streets(response: &OverpassResponse, language: Option<&str>) -> Vec<StreetSegment> {
    let mut streets = Vec::new();

    for element in &response.elements {
        if element.type_ != "way" {
            continue;
        }

        let geometry = match &element.geometry {
            Some(g) => g,
            None => continue,
        };

        let vertices: Vec<GeoPoint> = geometry
            .iter()
            .flatten()
            .map(|p| GeoPoint::new(p.lat, p.lon))
            .filter(GeoPoint::is_finite)
            .collect();

        let name = element
            .tags
            .as_ref()
            .and_then(|t| preferred_name(t, language))
            .map(str::to_string);

        if let Some(segment) = StreetSegment::new(name, vertices) {
            streets.push(segment);
        }
    }

    streets
}

fn element_location(element: &Element) -> Option<GeoPoint> {
    if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
        return Some(GeoPoint::new(lat, lon));
    }
    if let Some(LatLon { lat, lon }) = element.center {
        return Some(GeoPoint::new(lat, lon));
    }
    element.geometry.as_deref().and_then(geometry_centroid)
}

fn geometry_centroid(geometry: &[Option<LatLon>]) -> Option<GeoPoint> {
    let line: LineString<f64> = geometry
        .iter()
        .flatten()
        .map(|p| geo::coord! { x: p.lon, y: p.lat })
        .collect();

    line.centroid().map(|c| GeoPoint::new(c.y(), c.x()))
}
