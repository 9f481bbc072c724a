use rayon::prelude::*;
use tracing::{debug, info};

use super::{compose, dedupe};
use crate::config::EnrichConfig;
use crate::domain::{EnrichedPoi, RawPoi, Settlement, StreetSegment};
use crate::error::Result;
use crate::geometry::GridIndex;
use crate::resolve::{CityResolver, StreetResolver};

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// POIs handed to the pipeline
    pub input: usize,
    /// Dropped for an empty name or non-finite coordinates
    pub skipped: usize,
    pub inferred_cities: usize,
    pub inferred_streets: usize,
    pub duplicates: usize,
    pub emitted: usize,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<EnrichedPoi>,
    pub stats: RunStats,
}

/// A single enriched POI and which parts were inferred rather than tagged
#[derive(Debug, Clone)]
pub struct Enriched {
    pub record: EnrichedPoi,
    pub city_inferred: bool,
    pub street_inferred: bool,
}

/// Immutable reference data plus the enrichment steps
///
/// Built once per run; `run` only reads it, so POIs can be enriched from
/// several threads at once.
#[derive(Debug)]
pub struct Pipeline {
    config: EnrichConfig,
    cities: CityResolver,
    streets: StreetResolver,
}

impl Pipeline {
    pub fn new(
        config: EnrichConfig,
        settlements: Vec<Settlement>,
        streets: Vec<StreetSegment>,
    ) -> Result<Self> {
        config.validate()?;

        let index = GridIndex::build(streets, config.cell_size_deg);
        info!(
            settlements = settlements.len(),
            segments = index.len(),
            cells = index.cell_count(),
            "Built reference data"
        );

        Ok(Self {
            cities: CityResolver::new(settlements, config.city_radius_m),
            streets: StreetResolver::new(index, config.street_radius_m),
            config,
        })
    }

    /// Resolve city and street for one POI and compose its record
    ///
    /// Explicit `addr:*` tags always win; resolvers only run for missing parts.
    pub fn enrich_one(&self, poi: &RawPoi) -> Enriched {
        let language = self.config.language();

        let (city, city_inferred) = match poi.explicit_city(language) {
            Some(city) => (Some(city.to_string()), false),
            None => {
                let found = self.cities.resolve(poi.location).name;
                let inferred = found.is_some();
                (found, inferred)
            }
        };

        let (street, street_inferred) = match poi.explicit_street(language) {
            Some(street) => (Some(street.to_string()), false),
            None => {
                let found = self.streets.resolve(poi.location).name;
                let inferred = found.is_some();
                (found, inferred)
            }
        };

        Enriched {
            record: compose(poi, city.as_deref(), street.as_deref()),
            city_inferred,
            street_inferred,
        }
    }

    /// Enrich every valid POI, then drop duplicates
    ///
    /// Output order follows input order regardless of `parallel`.
    pub fn run(&self, pois: &[RawPoi]) -> PipelineOutput {
        let mut stats = RunStats {
            input: pois.len(),
            ..RunStats::default()
        };

        let valid: Vec<&RawPoi> = pois
            .iter()
            .filter(|poi| {
                let ok = poi.is_valid();
                if !ok {
                    debug!(name = poi.name.as_str(), "Skipping malformed POI");
                }
                ok
            })
            .collect();
        stats.skipped = pois.len() - valid.len();

        let enriched: Vec<Enriched> = if self.config.parallel {
            valid.par_iter().map(|poi| self.enrich_one(poi)).collect()
        } else {
            valid.iter().map(|poi| self.enrich_one(poi)).collect()
        };

        stats.inferred_cities = enriched.iter().filter(|e| e.city_inferred).count();
        stats.inferred_streets = enriched.iter().filter(|e| e.street_inferred).count();

        let records: Vec<EnrichedPoi> = enriched.into_iter().map(|e| e.record).collect();
        let before = records.len();
        let records = dedupe(records, self.config.dedup_lat_tolerance_deg);

        stats.duplicates = before - records.len();
        stats.emitted = records.len();

        PipelineOutput { records, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, GeoPoint};
    use std::collections::HashMap;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn street(name: &str, vertices: &[(f64, f64)]) -> StreetSegment {
        StreetSegment::new(
            Some(name.to_string()),
            vertices.iter().copied().map(GeoPoint::from).collect(),
        )
        .unwrap()
    }

    fn tel_aviv_pipeline(config: EnrichConfig) -> Pipeline {
        Pipeline::new(
            config,
            vec![
                Settlement::new("Tel Aviv", GeoPoint::new(32.0853, 34.7818)),
                Settlement::new("Jerusalem", GeoPoint::new(31.7683, 35.2137)),
            ],
            vec![
                // Second vertex ~40 m east of the supermarket
                street(
                    "Ibn Gabirol",
                    &[(32.0790, 34.7812), (32.0809, 34.78102), (32.0830, 34.7813)],
                ),
                street("Dizengoff", &[(32.0800, 34.7740), (32.0815, 34.7745)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_supermarket_gets_street_and_city() {
        let pipeline = tel_aviv_pipeline(EnrichConfig::default());
        let poi = RawPoi::new(
            "Shufersal",
            GeoPoint::new(32.0809, 34.7806),
            tags(&[("shop", "supermarket")]),
        );

        let output = pipeline.run(&[poi]);
        assert_eq!(output.records.len(), 1);

        let record = &output.records[0];
        assert_eq!(record.city.as_deref(), Some("Tel Aviv"));
        assert!(record.address.contains("Ibn Gabirol"));
        assert!(record.address.ends_with(", Tel Aviv"));
        assert_eq!(record.address, "Ibn Gabirol, Tel Aviv");
        assert_eq!(record.category, Category::Shop);

        assert_eq!(output.stats.inferred_cities, 1);
        assert_eq!(output.stats.inferred_streets, 1);
    }

    #[test]
    fn test_remote_poi_is_still_emitted() {
        let pipeline = Pipeline::new(
            EnrichConfig::default(),
            // ~50 km north of the POI
            vec![Settlement::new("Beersheba", GeoPoint::new(31.05, 34.8))],
            // ~5 km north of the POI
            vec![street("Route 40", &[(30.645, 34.8), (30.66, 34.8)])],
        )
        .unwrap();

        let poi = RawPoi::new(
            "Ramon Crater Lookout",
            GeoPoint::new(30.6, 34.8),
            tags(&[("tourism", "attraction")]),
        );
        let output = pipeline.run(&[poi]);

        assert_eq!(output.records.len(), 1);
        let record = &output.records[0];
        assert_eq!(record.city, None);
        assert_eq!(record.address, "");
        assert_eq!(record.category, Category::Tourism);
        assert_eq!(output.stats.inferred_cities, 0);
        assert_eq!(output.stats.inferred_streets, 0);
    }

    #[test]
    fn test_duplicate_pharmacies_collapse() {
        let pipeline = tel_aviv_pipeline(EnrichConfig::default());
        let pharmacy = |lat, lon| {
            RawPoi::new(
                "Central Pharmacy",
                GeoPoint::new(lat, lon),
                tags(&[("amenity", "pharmacy")]),
            )
        };

        let output = pipeline.run(&[pharmacy(32.0800, 34.7800), pharmacy(32.0801, 34.7801)]);
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].lat, 32.0800);
        assert_eq!(output.records[0].lon, 34.7800);
        assert_eq!(output.stats.duplicates, 1);
        assert_eq!(output.stats.emitted, 1);
    }

    #[test]
    fn test_explicit_tags_win() {
        let pipeline = tel_aviv_pipeline(EnrichConfig::default());
        let poi = RawPoi::new(
            "Beit Ariela",
            GeoPoint::new(32.0809, 34.7806),
            tags(&[
                ("amenity", "library"),
                ("addr:street", "Shaul HaMelech"),
                ("addr:housenumber", "25"),
                ("city:he", "תל אביב-יפו"),
            ]),
        );

        let enriched = pipeline.enrich_one(&poi);
        assert_eq!(enriched.record.address, "Shaul HaMelech 25, תל אביב-יפו");
        assert_eq!(enriched.record.city.as_deref(), Some("תל אביב-יפו"));
        assert_eq!(enriched.record.category, Category::Other);
        assert!(!enriched.city_inferred);
        assert!(!enriched.street_inferred);
    }

    #[test]
    fn test_malformed_pois_are_skipped() {
        let pipeline = tel_aviv_pipeline(EnrichConfig::default());
        let pois = vec![
            RawPoi::new("", GeoPoint::new(32.08, 34.78), HashMap::new()),
            RawPoi::new("Nan Cafe", GeoPoint::new(f64::NAN, 34.78), HashMap::new()),
            RawPoi::new("Habima", GeoPoint::new(32.0726, 34.7793), tags(&[("tourism", "attraction")])),
        ];

        let output = pipeline.run(&pois);
        assert_eq!(output.stats.input, 3);
        assert_eq!(output.stats.skipped, 2);
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].name, "Habima");
    }

    #[test]
    fn test_parallel_and_sequential_runs_match() {
        let pois: Vec<RawPoi> = (0..200)
            .map(|i| {
                let offset = f64::from(i) * 0.00037;
                RawPoi::new(
                    format!("Kiosk {}", i % 17),
                    GeoPoint::new(32.070 + offset % 0.03, 34.770 + offset % 0.02),
                    tags(&[("shop", "kiosk")]),
                )
            })
            .collect();

        let parallel = tel_aviv_pipeline(EnrichConfig::default()).run(&pois);
        let sequential = tel_aviv_pipeline(EnrichConfig {
            parallel: false,
            ..EnrichConfig::default()
        })
        .run(&pois);

        assert_eq!(
            serde_json::to_string(&parallel.records).unwrap(),
            serde_json::to_string(&sequential.records).unwrap()
        );
        assert_eq!(parallel.stats, sequential.stats);

        let again = tel_aviv_pipeline(EnrichConfig::default()).run(&pois);
        assert_eq!(parallel.records, again.records);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EnrichConfig {
            cell_size_deg: -0.01,
            ..EnrichConfig::default()
        };
        assert!(Pipeline::new(config, Vec::new(), Vec::new()).is_err());
    }
}
