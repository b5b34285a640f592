use crate::result::CommonResult;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CommonResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a JSON file if it exists
pub fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> CommonResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}
