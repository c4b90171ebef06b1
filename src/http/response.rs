//! Response wrapper and tolerant body readers

use crate::error::{Error, Result};
use crate::types::JsonValue;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A successful API response with its body fully read
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the JSON body
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as a JSON value; an empty body reads as `null`
    pub fn value(&self) -> Result<JsonValue> {
        if self.body.is_empty() {
            return Ok(JsonValue::Null);
        }
        self.json()
    }
}

/// List body either wrapped in `data` or returned bare
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

/// Read a list body as `data` (wrapped), else the body itself, else empty
pub fn read_list<T: DeserializeOwned>(body: &JsonValue) -> Vec<T> {
    match ListEnvelope::<T>::deserialize(body) {
        Ok(ListEnvelope::Wrapped { data } | ListEnvelope::Bare(data)) => data,
        Err(_) => Vec::new(),
    }
}

/// Extract the `message` field servers put in error bodies
pub fn server_message(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}

/// Turn a non-success status and body into an error
pub(crate) fn status_error(status: StatusCode, body: &Bytes) -> Error {
    Error::http_status(
        status.as_u16(),
        server_message(body),
        String::from_utf8_lossy(body).into_owned(),
    )
}
