//! Outgoing request description
//!
//! An `ApiRequest` is plain data so it can be dispatched again, unchanged,
//! when a rate-limited request is retried. Multipart bodies keep the file
//! bytes and rebuild the form on every dispatch.

use crate::types::{JsonValue, Method, StringMap};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};

/// Request body
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON body
    Json(JsonValue),
    /// Single-file multipart form
    Multipart(FilePart),
}

/// One file sent as a multipart form field
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    /// File name reported to the server
    pub file_name: String,
    /// MIME type of the contents
    pub content_type: String,
    /// File contents
    pub data: Bytes,
}

impl FilePart {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Build a fresh multipart form holding this file
    pub(crate) fn to_form(&self) -> reqwest::Result<Form> {
        let part = Part::bytes(self.data.to_vec())
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)?;
        Ok(Form::new().part(self.field.clone(), part))
    }
}

/// A request to the admin API
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL (or an absolute URL)
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request headers, overriding the client defaults
    pub headers: StringMap,
    /// Request body
    pub body: RequestBody,
    retried: bool,
}

impl ApiRequest {
    /// Create a request with no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn put(path: impl Into<String>, body: JsonValue) -> Self {
        Self::new(Method::PUT, path).json(body)
    }

    pub fn patch(path: impl Into<String>, body: JsonValue) -> Self {
        Self::new(Method::PATCH, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// POST a single file as a multipart form
    pub fn upload(path: impl Into<String>, file: FilePart) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = RequestBody::Multipart(file);
        request
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Whether this request has already been retried after a 429
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
