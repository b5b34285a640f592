use postkit_common::read_json_if_exists;
use postkit_editor::EmotionCatalog;
use postkit_upload::UploadConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "postkit.config.json";

/// Postkit configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Upload transport options
    #[serde(default)]
    pub upload: UploadConfig,

    /// Emotion catalog description (relative to the config file); emotions
    /// are disabled without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion_data: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        // Return default config if none exists
        Ok(read_json_if_exists(&config_path)?.unwrap_or_default())
    }

    pub fn emotion_data_path(&self, cwd: &str) -> Option<PathBuf> {
        self.emotion_data
            .as_ref()
            .map(|path| Path::new(cwd).join(path))
    }

    /// Emotion catalog, or `None` when emotions are not configured
    pub fn emotion_catalog(&self, cwd: &str) -> anyhow::Result<Option<EmotionCatalog>> {
        match self.emotion_data_path(cwd) {
            Some(path) => Ok(Some(EmotionCatalog::load(&path)?)),
            None => Ok(None),
        }
    }
}
