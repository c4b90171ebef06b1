//! Image upload module
//!
//! The widget behind every image field of the dashboard forms: it validates
//! a selection, uploads accepted files through the API client and hands the
//! hosted URLs back to the form.

mod extract;
mod types;
mod uploader;

pub use extract::{extract_url, UploadData, UploadEnvelope, UrlLocation};
pub use types::{
    ImageValue, PickerState, SelectedFile, SkipReason, SkippedFile, UploadOptions, UploadOutcome,
    UploadSettings, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_IMAGES,
};
pub use uploader::{ImageUploader, UploadingFlag, UPLOAD_FAILED_MESSAGE};

#[cfg(test)]
mod tests;
