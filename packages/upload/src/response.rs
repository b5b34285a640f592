//! Wire response of the upload endpoint and its normalized form

use serde::{Deserialize, Deserializer, Serialize};

/// `{code, msg?, data?: {url, id, size, name}}`; `code == 0` means success
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub code: i64,

    #[serde(default)]
    pub msg: Option<String>,

    #[serde(default)]
    pub data: Option<UploadResponseData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponseData {
    pub url: String,

    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub name: String,
}

/// Ids arrive as strings or as bare numbers depending on the backend
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadUrls {
    pub default: String,
}

/// Normalized descriptor of a finished upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub urls: UploadUrls,
    pub upload_id: String,
    pub upload_size: u64,
    pub upload_name: String,
}

impl UploadedFile {
    pub fn new(url: impl Into<String>, id: impl Into<String>, size: u64, name: impl Into<String>) -> Self {
        Self {
            urls: UploadUrls { default: url.into() },
            upload_id: id.into(),
            upload_size: size,
            upload_name: name.into(),
        }
    }
}

impl From<UploadResponseData> for UploadedFile {
    fn from(data: UploadResponseData) -> Self {
        Self::new(data.url, data.id, data.size, data.name)
    }
}
