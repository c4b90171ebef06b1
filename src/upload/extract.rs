//! Hosted URL extraction from upload responses
//!
//! The upload endpoint has answered in several shapes over time. The body is
//! parsed into one typed envelope and a fixed list of locations is tried in
//! order; the first non-empty string wins.

use crate::types::{JsonValue, OptionStringExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Parsed upload response
#[derive(Debug, Default, Deserialize)]
pub struct UploadEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<UploadData>,
    #[serde(default, rename = "fileUrl", deserialize_with = "lenient")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// Nested `data` object of an upload response
#[derive(Debug, Default, Deserialize)]
pub struct UploadData {
    #[serde(default, rename = "fileUrl", deserialize_with = "lenient")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// Fields of unexpected type read as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl UploadEnvelope {
    /// Parse a response body; anything that is not an object is empty
    pub fn from_value(body: &JsonValue) -> Self {
        Self::deserialize(body).unwrap_or_default()
    }
}

/// A place in the envelope where the URL may be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlLocation {
    DataFileUrl,
    DataUrl,
    FileUrl,
    Url,
}

impl UrlLocation {
    /// Locations in the order they are tried
    pub const ORDER: [UrlLocation; 4] = [
        UrlLocation::DataFileUrl,
        UrlLocation::DataUrl,
        UrlLocation::FileUrl,
        UrlLocation::Url,
    ];

    /// Dotted path of this location
    pub fn path(self) -> &'static str {
        match self {
            UrlLocation::DataFileUrl => "data.fileUrl",
            UrlLocation::DataUrl => "data.url",
            UrlLocation::FileUrl => "fileUrl",
            UrlLocation::Url => "url",
        }
    }

    fn read(self, envelope: &UploadEnvelope) -> Option<&String> {
        match self {
            UrlLocation::DataFileUrl => envelope.data.as_ref()?.file_url.as_ref(),
            UrlLocation::DataUrl => envelope.data.as_ref()?.url.as_ref(),
            UrlLocation::FileUrl => envelope.file_url.as_ref(),
            UrlLocation::Url => envelope.url.as_ref(),
        }
    }

    /// Non-empty URL at this location
    pub fn extract(self, envelope: &UploadEnvelope) -> Option<String> {
        self.read(envelope).cloned().none_if_empty()
    }
}

/// First URL found, trying `UrlLocation::ORDER`
pub fn extract_url(body: &JsonValue) -> Option<String> {
    let envelope = UploadEnvelope::from_value(body);
    UrlLocation::ORDER
        .iter()
        .find_map(|location| location.extract(&envelope))
}
