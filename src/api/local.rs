use std::fs;
use std::io::BufReader;
use std::path::Path;

use super::OverpassResponse;
use crate::error::FetchError;

/// Load a saved Overpass JSON response
pub fn load_dataset(path: &Path) -> Result<OverpassResponse, FetchError> {
    let file = fs::File::open(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| FetchError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save an Overpass response so later runs can load it offline
pub fn save_dataset(path: &Path, response: &OverpassResponse) -> Result<(), FetchError> {
    let io_err = |source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_vec(response).map_err(|source| FetchError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_err)
}
