use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::Dataset;
use crate::config::{BoundingBox, OverpassConfig};
use crate::error::FetchError;

const USER_AGENT: &str = "osm2poi/0.1.0";

/// Amenity values that make a feature worth indexing
const POI_AMENITIES: &str =
    "hospital|clinic|pharmacy|school|university|college|police|post_office|townhall|bank";
const POI_SHOPS: &str = "supermarket|mall|department_store";
const POI_LEISURE: &str = "park|sports_centre";
const POI_TOURISM: &str = "attraction|museum|hotel";
const PLACE_TYPES: &str = "city|town|village|hamlet|kibbutz|moshav";

/// Raw Overpass API response
#[derive(Debug, Deserialize, Serialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
}

/// A coordinate pair as Overpass emits it in `center` and `geometry`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// A single element from Overpass (node or way)
#[derive(Debug, Deserialize, Serialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Present on ways fetched with `out center`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLon>,
    /// Present on ways fetched with `out geom`; entries may be null for clipped nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Vec<Option<LatLon>>>,
}

/// Overpass QL query for one dataset within `bbox`
pub fn build_query(dataset: Dataset, bbox: &BoundingBox) -> String {
    let b = bbox.overpass_filter();
    match dataset {
        Dataset::Pois => format!(
            r#"[out:json][timeout:120];
(
  node["amenity"~"{POI_AMENITIES}"]{b};
  way["amenity"~"{POI_AMENITIES}"]{b};
  node["shop"~"{POI_SHOPS}"]{b};
  way["shop"~"{POI_SHOPS}"]{b};
  node["leisure"~"{POI_LEISURE}"]{b};
  way["leisure"~"{POI_LEISURE}"]{b};
  node["tourism"~"{POI_TOURISM}"]{b};
  way["tourism"~"{POI_TOURISM}"]{b};
);
out center;"#
        ),
        Dataset::Streets => format!(
            r#"[out:json][timeout:120];
way["highway"]["name"]{b};
out geom;"#
        ),
        Dataset::Settlements => format!(
            r#"[out:json][timeout:60];
node["place"~"{PLACE_TYPES}"]{b};
out body;"#
        ),
    }
}

/// Fetch one raw dataset from the Overpass API
pub fn fetch_dataset(
    dataset: Dataset,
    bbox: &BoundingBox,
    config: &OverpassConfig,
) -> Result<OverpassResponse, FetchError> {
    let query = build_query(dataset, bbox);
    debug!(%dataset, "Querying Overpass");
    execute_overpass_query(&query, config)
}

/// Execute an Overpass API query, rotating mirrors and retrying 429/504
fn execute_overpass_query(
    query: &str,
    config: &OverpassConfig,
) -> Result<OverpassResponse, FetchError> {
    if config.urls.is_empty() {
        return Err(FetchError::NoEndpoints);
    }

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let max_retries = config.max_retries.max(1);
    let mut last_error = None;

    for attempt in 0..max_retries {
        let url = &config.urls[attempt as usize % config.urls.len()];

        if attempt > 0 {
            let wait_secs = 30 * attempt as u64;
            warn!(
                url = url.as_str(),
                attempt = attempt + 1,
                max_retries,
                "Overpass API unavailable, retrying in {} seconds",
                wait_secs
            );
            std::thread::sleep(Duration::from_secs(wait_secs));
        }

        // Overpass expects form-encoded `data=<query>`, not a raw body
        let response = match client.post(url).form(&[("data", query)]).send() {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(format!("{url}: {e}"));
                continue;
            }
        };

        match response.status().as_u16() {
            200 => return Ok(response.json()?),
            429 | 504 => {
                last_error = Some(format!(
                    "{url} returned status {} (attempt {})",
                    response.status(),
                    attempt + 1
                ));
            }
            status => {
                return Err(FetchError::Status {
                    url: url.clone(),
                    status,
                });
            }
        }
    }

    Err(FetchError::RetriesExhausted {
        attempts: max_retries,
        last: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_uses_bbox() {
        let bbox = BoundingBox::default();
        let query = build_query(Dataset::Streets, &bbox);
        assert!(query.contains(r#"way["highway"]["name"](29.3,34,33.5,35.9);"#));
        assert!(query.ends_with("out geom;"));

        let query = build_query(Dataset::Pois, &bbox);
        assert!(query.contains("pharmacy|school"));
        assert!(query.contains("out center;"));
        assert_eq!(query.matches("(29.3,34,33.5,35.9)").count(), 8);

        let query = build_query(Dataset::Settlements, &bbox);
        assert!(query.contains("kibbutz|moshav"));
    }

    #[test]
    fn test_no_endpoints() {
        let config = OverpassConfig {
            urls: Vec::new(),
            ..OverpassConfig::default()
        };
        let err = fetch_dataset(Dataset::Pois, &BoundingBox::default(), &config).unwrap_err();
        assert!(matches!(err, FetchError::NoEndpoints));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "elements": [
                {"type": "node", "id": 1, "lat": 32.08, "lon": 34.78, "tags": {"shop": "mall", "name": "Azrieli"}},
                {"type": "way", "id": 2, "center": {"lat": 32.07, "lon": 34.79}, "tags": {"amenity": "school"}},
                {"type": "way", "id": 3, "geometry": [{"lat": 32.0, "lon": 34.0}, null], "tags": {"highway": "residential"}}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 3);
        assert_eq!(response.elements[0].type_, "node");
        assert_eq!(response.elements[1].center.unwrap().lat, 32.07);
        let geometry = response.elements[2].geometry.as_ref().unwrap();
        assert_eq!(geometry.len(), 2);
        assert!(geometry[1].is_none());
    }
}
