//! osm2poi - Enrich OpenStreetMap points of interest with inferred streets and
//! cities for an offline search index

pub mod api;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod geometry;
pub mod osm;
pub mod resolve;

pub use domain::{Category, EnrichedPoi, GeoPoint, RawPoi, Settlement, StreetSegment};
pub use enrich::{Pipeline, PipelineOutput, RunStats, compose, dedupe};
pub use error::{EnrichError, FetchError};
pub use geometry::{GridIndex, distance_meters};
pub use resolve::{CityResolver, Match, StreetResolver, resolve_city, resolve_street};
