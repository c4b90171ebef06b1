//! Upload widget types

use crate::error::{Error, Result, ResultExt};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted file: 5 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default cap on images in multi mode
pub const DEFAULT_MAX_IMAGES: usize = 5;

/// Per-use-case widget options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Allow more than one image
    pub multiple: bool,
    /// Cap on total images when `multiple` is set
    pub max_images: usize,
    /// File-picker MIME filter
    pub accept: String,
    /// Display caption
    pub label: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            multiple: false,
            max_images: DEFAULT_MAX_IMAGES,
            accept: "image/*".to_string(),
            label: None,
        }
    }
}

impl UploadOptions {
    /// Single-image widget
    pub fn single() -> Self {
        Self::default()
    }

    /// Multi-image widget holding up to `max_images`
    pub fn multiple(max_images: usize) -> Self {
        Self {
            multiple: true,
            max_images,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Where and how files are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Upload endpoint
    pub path: String,
    /// Multipart field carrying the file
    pub field_name: String,
    /// Files above this size are skipped
    pub max_file_size_bytes: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            path: "/upload/single".to_string(),
            field_name: "file".to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// The value reported to the owning form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageValue {
    /// Single mode: the URL, or an empty string when there is none
    Single(String),
    /// Multi mode: every URL in upload order
    Multiple(Vec<String>),
}

impl ImageValue {
    /// Previews seeded from this value
    pub fn into_previews(self) -> Vec<String> {
        match self {
            ImageValue::Single(url) if url.is_empty() => Vec::new(),
            ImageValue::Single(url) => vec![url],
            ImageValue::Multiple(urls) => urls,
        }
    }
}

/// A file picked by the user
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// File name
    pub name: String,
    /// Declared MIME type
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    /// Contents
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Read a file from disk, guessing its type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, content_type, data))
    }

    /// Whether the declared type is an image type
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Why a file was left out of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAnImage,
    TooLarge,
}

/// A file skipped by per-file validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: SkipReason,
}

/// What a call to `select_files` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Empty selection
    Ignored,
    /// Whole batch rejected before any upload
    Rejected { message: String },
    /// Batch processed; `uploaded` holds the new URLs in selection order
    Completed {
        uploaded: Vec<String>,
        skipped: Vec<SkippedFile>,
    },
    /// An upload call failed; nothing from the batch was kept
    Failed {
        message: String,
        skipped: Vec<SkippedFile>,
    },
}

impl UploadOutcome {
    /// URLs added by this batch
    pub fn uploaded(&self) -> &[String] {
        match self {
            UploadOutcome::Completed { uploaded, .. } => uploaded,
            _ => &[],
        }
    }
}

/// How the file picker should be displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    /// Whether a new selection can be made
    pub enabled: bool,
    /// MIME filter
    pub accept: String,
    pub label: Option<String>,
    /// Images currently held
    pub count: usize,
    /// Cap, in multi mode
    pub max: Option<usize>,
}

impl PickerState {
    /// `count/max` indicator shown in multi mode
    pub fn indicator(&self) -> Option<String> {
        self.max.map(|max| format!("{}/{}", self.count, max))
    }
}
