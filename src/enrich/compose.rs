use crate::domain::{Category, EnrichedPoi, RawPoi};

/// Decimal places kept in emitted coordinates (~11 m)
const COORD_DECIMALS: i32 = 4;

/// Assemble the output record for `poi`
///
/// `city` and `street` are the already-decided values, explicit or inferred.
/// Coordinates are rounded here and nowhere earlier.
pub fn compose(poi: &RawPoi, city: Option<&str>, street: Option<&str>) -> EnrichedPoi {
    let city = city.map(str::trim).filter(|c| !c.is_empty());

    EnrichedPoi {
        name: poi.name.clone(),
        lat: round_coord(poi.location.lat),
        lon: round_coord(poi.location.lon),
        category: Category::from_tags(&poi.tags),
        address: format_address(street, poi.house_number(), city),
        city: city.map(str::to_string),
    }
}

/// `"{street} {house_number}, {city}"` with absent parts and their separators dropped
///
/// The house number is only rendered after a street.
pub fn format_address(street: Option<&str>, house_number: Option<&str>, city: Option<&str>) -> String {
    let mut address = String::new();

    if let Some(street) = street.map(str::trim).filter(|s| !s.is_empty()) {
        address.push_str(street);
        if let Some(number) = house_number.map(str::trim).filter(|n| !n.is_empty()) {
            address.push(' ');
            address.push_str(number);
        }
    }

    if let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) {
        if !address.is_empty() {
            address.push_str(", ");
        }
        address.push_str(city);
    }

    address
}

fn round_coord(value: f64) -> f64 {
    let factor = 10f64.powi(COORD_DECIMALS);
    (value * factor).round() / factor
}
