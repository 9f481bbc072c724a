use std::fs;
use std::path::Path;

use crate::domain::EnrichedPoi;
use crate::error::{EnrichError, Result};

/// Write records as a compact JSON array
///
/// The whole document is serialized before the file is touched, so a
/// serialization failure never leaves a truncated file behind.
pub fn write_records(path: &Path, records: &[EnrichedPoi]) -> Result<usize> {
    let json = serde_json::to_vec(records)?;
    let output_err = |source| EnrichError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_err)?;
    }
    fs::write(path, &json).map_err(output_err)?;

    Ok(json.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use tempfile::TempDir;

    #[test]
    fn test_write_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("poi.json");
        let records = vec![
            EnrichedPoi {
                name: "Rambam".to_string(),
                lat: 32.8343,
                lon: 34.9857,
                category: Category::Health,
                address: "HaAliya HaShniya 8, Haifa".to_string(),
                city: Some("Haifa".to_string()),
            },
            EnrichedPoi {
                name: "Ein Avdat".to_string(),
                lat: 30.8223,
                lon: 34.7636,
                category: Category::Leisure,
                address: String::new(),
                city: None,
            },
        ];

        let bytes = write_records(&path, &records).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.len(), bytes);
        assert_eq!(
            contents,
            r#"[{"n":"Rambam","l":32.8343,"o":34.9857,"c":"H","a":"HaAliya HaShniya 8, Haifa","ci":"Haifa"},{"n":"Ein Avdat","l":30.8223,"o":34.7636,"c":"L","a":""}]"#
        );

        let parsed: Vec<EnrichedPoi> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, records);
    }
}
