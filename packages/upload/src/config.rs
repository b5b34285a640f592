use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_API_URL: &str = "/attach/upload";
pub const DEFAULT_FILE_FIELD: &str = "upload";

/// Upload transport options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    /// Byte limit; 0 means unlimited
    pub max_size: u64,

    /// Upload endpoint, absolute or relative to `base_url`
    pub api_url: String,

    pub base_url: Option<String>,

    /// Extra form fields sent before the file
    pub upload_params: BTreeMap<String, String>,

    /// Permitted extensions, case-insensitive; empty permits any
    pub allow_ext: Vec<String>,

    /// Form field carrying the file
    pub file_field: String,

    /// No timeout when absent
    pub timeout_secs: Option<u64>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size: 0,
            api_url: DEFAULT_API_URL.to_string(),
            base_url: None,
            upload_params: BTreeMap::new(),
            allow_ext: Vec::new(),
            file_field: DEFAULT_FILE_FIELD.to_string(),
            timeout_secs: None,
        }
    }
}

impl UploadConfig {
    /// Endpoint with `base_url` applied to a relative `api_url`
    pub fn endpoint(&self) -> String {
        if self.api_url.contains("://") {
            return self.api_url.clone();
        }
        match &self.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.api_url.trim_start_matches('/')
            ),
            None => self.api_url.clone(),
        }
    }
}
