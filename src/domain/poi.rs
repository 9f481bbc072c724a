use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::GeoPoint;

/// Search category of a POI, serialized as its single-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "H")]
    Health,
    #[serde(rename = "E")]
    Education,
    #[serde(rename = "G")]
    Government,
    #[serde(rename = "S")]
    Shop,
    #[serde(rename = "L")]
    Leisure,
    #[serde(rename = "T")]
    Tourism,
    #[serde(rename = "O")]
    Other,
}

impl Category {
    /// Classify a POI from its OSM tags
    ///
    /// Amenity keywords take precedence over shop, then leisure, then tourism.
    /// An amenity outside the known keyword lists falls through to the later rules.
    pub fn from_tags(tags: &HashMap<String, String>) -> Category {
        if let Some(amenity) = tags.get("amenity") {
            match amenity.as_str() {
                "hospital" | "clinic" | "pharmacy" => return Category::Health,
                "school" | "university" | "college" => return Category::Education,
                "police" | "post_office" | "townhall" | "bank" => return Category::Government,
                _ => {}
            }
        }
        if tags.contains_key("shop") {
            Category::Shop
        } else if tags.contains_key("leisure") {
            Category::Leisure
        } else if tags.contains_key("tourism") {
            Category::Tourism
        } else {
            Category::Other
        }
    }

    pub fn code(&self) -> char {
        match self {
            Category::Health => 'H',
            Category::Education => 'E',
            Category::Government => 'G',
            Category::Shop => 'S',
            Category::Leisure => 'L',
            Category::Tourism => 'T',
            Category::Other => 'O',
        }
    }
}

/// A tagged source feature before enrichment
#[derive(Debug, Clone)]
pub struct RawPoi {
    pub name: String,
    pub location: GeoPoint,
    pub tags: HashMap<String, String>,
}

impl RawPoi {
    pub fn new(name: impl Into<String>, location: GeoPoint, tags: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            location,
            tags,
        }
    }

    /// Non-blank name and finite coordinates
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.location.is_finite()
    }

    /// Tag value, treating empty strings as absent
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// City given by the source tags: `addr:city`, then `city:{language}`
    pub fn explicit_city(&self, language: Option<&str>) -> Option<&str> {
        self.tag("addr:city")
            .or_else(|| language.and_then(|lang| self.tag(&format!("city:{lang}"))))
    }

    /// Street given by the source tags: `addr:street`, then `street:{language}`
    pub fn explicit_street(&self, language: Option<&str>) -> Option<&str> {
        self.tag("addr:street")
            .or_else(|| language.and_then(|lang| self.tag(&format!("street:{lang}"))))
    }

    pub fn house_number(&self) -> Option<&str> {
        self.tag("addr:housenumber")
    }
}

/// Addressed output record in the compact search-index format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPoi {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "l")]
    pub lat: f64,
    #[serde(rename = "o")]
    pub lon: f64,
    #[serde(rename = "c")]
    pub category: Category,
    #[serde(rename = "a")]
    pub address: String,
    #[serde(rename = "ci", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}
