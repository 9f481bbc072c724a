use std::collections::HashMap;

use crate::domain::EnrichedPoi;

/// Default latitude tolerance for two same-named records to count as one place
pub const DEFAULT_DEDUP_LAT_TOLERANCE: f64 = 0.001;

/// Drop records that repeat an earlier record's name at nearly the same latitude
///
/// A record is a duplicate when any earlier record (kept or not) has the
/// identical name and a rounded latitude less than `lat_tolerance` away. The
/// first occurrence always survives; duplicates are dropped, never merged.
pub fn dedupe(records: Vec<EnrichedPoi>, lat_tolerance: f64) -> Vec<EnrichedPoi> {
    let keep: Vec<bool> = {
        let mut seen: HashMap<&str, Vec<f64>> = HashMap::new();
        records
            .iter()
            .map(|record| {
                let lats = seen.entry(record.name.as_str()).or_default();
                let duplicate = lats
                    .iter()
                    .any(|&lat| (lat - record.lat).abs() < lat_tolerance);
                lats.push(record.lat);
                !duplicate
            })
            .collect()
    };

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
