use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::api::Dataset;
use crate::enrich::DEFAULT_DEDUP_LAT_TOLERANCE;
use crate::error::{EnrichError, Result};
use crate::resolve::city::DEFAULT_CITY_RADIUS_M;
use crate::resolve::street::DEFAULT_STREET_RADIUS_M;

/// Grid cell edge in degrees (~1.1 km of latitude)
pub const DEFAULT_CELL_SIZE_DEG: f64 = 0.01;

/// Smallest cell size whose keys stay well inside `i64` for any coordinate
pub const MIN_CELL_SIZE_DEG: f64 = 1e-9;

fn default_cell_size() -> f64 {
    DEFAULT_CELL_SIZE_DEG
}
fn default_city_radius() -> f64 {
    DEFAULT_CITY_RADIUS_M
}
fn default_street_radius() -> f64 {
    DEFAULT_STREET_RADIUS_M
}
fn default_dedup_tolerance() -> f64 {
    DEFAULT_DEDUP_LAT_TOLERANCE
}
fn default_language() -> String {
    "he".to_string()
}
fn default_parallel() -> bool {
    true
}

/// Tunables of the enrichment pipeline
#[derive(Debug, Deserialize, Clone)]
pub struct EnrichConfig {
    #[serde(default = "default_cell_size")]
    pub cell_size_deg: f64,
    #[serde(default = "default_city_radius")]
    pub city_radius_m: f64,
    #[serde(default = "default_street_radius")]
    pub street_radius_m: f64,
    #[serde(default = "default_dedup_tolerance")]
    pub dedup_lat_tolerance_deg: f64,
    /// Preferred name language, e.g. "he" reads `name:he` before `name`.
    /// An empty string disables localized lookups.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            cell_size_deg: default_cell_size(),
            city_radius_m: default_city_radius(),
            street_radius_m: default_street_radius(),
            dedup_lat_tolerance_deg: default_dedup_tolerance(),
            language: default_language(),
            parallel: default_parallel(),
        }
    }
}

impl EnrichConfig {
    pub fn language(&self) -> Option<&str> {
        Some(self.language.trim()).filter(|l| !l.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size_deg.is_finite() && self.cell_size_deg >= MIN_CELL_SIZE_DEG) {
            return Err(EnrichError::ConfigInvalid {
                key: "cell_size_deg",
                reason: format!(
                    "must be a number of at least {MIN_CELL_SIZE_DEG}, got {}",
                    self.cell_size_deg
                ),
            });
        }

        let non_negative = [
            ("city_radius_m", self.city_radius_m),
            ("street_radius_m", self.street_radius_m),
            ("dedup_lat_tolerance_deg", self.dedup_lat_tolerance_deg),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EnrichError::ConfigInvalid {
                    key,
                    reason: format!("must be a non-negative number, got {value}"),
                });
            }
        }

        Ok(())
    }
}

/// Query area as (south, west, north, east) degrees
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            south: 29.3,
            west: 34.0,
            north: 33.5,
            east: 35.9,
        }
    }
}

impl BoundingBox {
    /// Parse "south,west,north,east"
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        let parts: Vec<f64> = value
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
            .collect::<std::result::Result<_, _>>()?;

        let [south, west, north, east] = parts[..] else {
            return Err(format!("expected 4 comma-separated values, got {}", parts.len()));
        };

        if south >= north || west >= east {
            return Err("south/west must be smaller than north/east".to_string());
        }

        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Overpass QL bbox filter, e.g. `(29.3,34,33.5,35.9)`
    pub fn overpass_filter(&self) -> String {
        format!("({},{},{},{})", self.south, self.west, self.north, self.east)
    }
}

fn default_overpass_urls() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.private.coffee/api/interpreter".to_string(),
        "https://maps.mail.ru/osm/tools/overpass/api/interpreter".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    200
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            urls: default_overpass_urls(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Local Overpass JSON dumps used instead of live queries
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InputFiles {
    #[serde(default)]
    pub pois: Option<PathBuf>,
    #[serde(default)]
    pub streets: Option<PathBuf>,
    #[serde(default)]
    pub settlements: Option<PathBuf>,
}

impl InputFiles {
    pub fn path_for(&self, dataset: Dataset) -> Option<&Path> {
        match dataset {
            Dataset::Pois => self.pois.as_deref(),
            Dataset::Streets => self.streets.as_deref(),
            Dataset::Settlements => self.settlements.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub enrich: Option<EnrichConfig>,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub overpass: Option<OverpassConfig>,
    #[serde(default)]
    pub inputs: Option<InputFiles>,
}

impl FileConfig {
    /// First parseable config file from the search path, if any
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("osm2poi.toml"));
    paths.push(PathBuf::from(".osm2poi.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("osm2poi").join("config.toml"));
        paths.push(config_dir.join("osm2poi.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".osm2poi.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnrichConfig::default();
        assert_eq!(config.cell_size_deg, 0.01);
        assert_eq!(config.city_radius_m, 10_000.0);
        assert_eq!(config.street_radius_m, 100.0);
        assert_eq!(config.dedup_lat_tolerance_deg, 0.001);
        assert_eq!(config.language(), Some("he"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_file_config() {
        let toml = r#"
            output = "data/poi.json"

            [enrich]
            street_radius_m = 75.0
            language = ""

            [bbox]
            south = 31.0
            west = 34.2
            north = 32.5
            east = 35.3

            [inputs]
            streets = "raw/streets.json"
        "#;

        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("data/poi.json")));

        let enrich = config.enrich.unwrap();
        assert_eq!(enrich.street_radius_m, 75.0);
        assert_eq!(enrich.city_radius_m, 10_000.0);
        assert_eq!(enrich.language(), None);

        assert_eq!(config.bbox.unwrap().south, 31.0);
        assert!(config.overpass.is_none());

        let inputs = config.inputs.unwrap();
        assert_eq!(
            inputs.path_for(Dataset::Streets),
            Some(Path::new("raw/streets.json"))
        );
        assert_eq!(inputs.path_for(Dataset::Pois), None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = EnrichConfig {
            cell_size_deg: 0.0,
            ..EnrichConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EnrichError::ConfigInvalid { key: "cell_size_deg", .. })
        ));

        let config = EnrichConfig {
            cell_size_deg: 1e-20,
            ..EnrichConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EnrichError::ConfigInvalid { key: "cell_size_deg", .. })
        ));

        let config = EnrichConfig {
            cell_size_deg: MIN_CELL_SIZE_DEG,
            ..EnrichConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = EnrichConfig {
            street_radius_m: -1.0,
            ..EnrichConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EnrichError::ConfigInvalid { key: "street_radius_m", .. })
        ));

        let config = EnrichConfig {
            city_radius_m: f64::NAN,
            ..EnrichConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bbox_parse() {
        let bbox = BoundingBox::parse("31.0, 34.2, 32.5, 35.3").unwrap();
        assert_eq!(bbox.overpass_filter(), "(31,34.2,32.5,35.3)");

        assert!(BoundingBox::parse("31.0,34.2,32.5").is_err());
        assert!(BoundingBox::parse("32.5,34.2,31.0,35.3").is_err());
        assert!(BoundingBox::parse("a,b,c,d").is_err());
    }

    #[test]
    fn test_default_bbox_filter() {
        assert_eq!(BoundingBox::default().overpass_filter(), "(29.3,34,33.5,35.9)");
    }
}
