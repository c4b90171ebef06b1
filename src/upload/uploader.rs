//! Multi-image upload widget
//!
//! Turns a file selection into hosted image URLs. A batch is checked as a
//! whole first (count / multiplicity), then each file is validated and
//! uploaded one at a time so the resulting URLs keep selection order.

use super::extract::extract_url;
use super::types::{
    ImageValue, PickerState, SelectedFile, SkipReason, SkippedFile, UploadOptions, UploadOutcome,
    UploadSettings,
};
use crate::error::Result;
use crate::http::{ApiClient, FilePart};
use crate::notify::Notifier;
use crate::types::JsonValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notice shown when an upload call fails without a server message
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload image";

type ChangeListener = Box<dyn FnMut(&ImageValue) + Send>;

/// Clears the uploading flag when the batch ends, even if its future is dropped
struct UploadingGuard(Arc<AtomicBool>);

impl UploadingGuard {
    fn enter(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for UploadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Read-only handle on the widget's uploading state
///
/// Stays valid while `select_files` holds the widget, so a caller can keep
/// the picker disabled for the whole batch.
#[derive(Debug, Clone)]
pub struct UploadingFlag(Arc<AtomicBool>);

impl UploadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Image upload widget state
pub struct ImageUploader {
    client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    options: UploadOptions,
    settings: UploadSettings,
    previews: Vec<String>,
    uploading: Arc<AtomicBool>,
    on_change: Option<ChangeListener>,
}

impl ImageUploader {
    /// Create an empty widget
    pub fn new(client: Arc<ApiClient>, notifier: Arc<dyn Notifier>, options: UploadOptions) -> Self {
        Self {
            client,
            notifier,
            options,
            settings: UploadSettings::default(),
            previews: Vec::new(),
            uploading: Arc::new(AtomicBool::new(false)),
            on_change: None,
        }
    }

    /// Seed previews from the form's current value
    #[must_use]
    pub fn with_value(mut self, value: ImageValue) -> Self {
        self.previews = value.into_previews();
        self
    }

    /// Override endpoint, field name and size limit
    #[must_use]
    pub fn with_settings(mut self, settings: UploadSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Register the listener told about every change of value
    #[must_use]
    pub fn on_change(mut self, listener: impl FnMut(&ImageValue) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(listener));
        self
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Image references currently held, in upload order
    pub fn previews(&self) -> &[String] {
        &self.previews
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    /// Handle that observes `is_uploading` from outside the widget
    pub fn uploading_flag(&self) -> UploadingFlag {
        UploadingFlag(Arc::clone(&self.uploading))
    }

    /// Value as reported to the form
    pub fn value(&self) -> ImageValue {
        if self.options.multiple {
            ImageValue::Multiple(self.previews.clone())
        } else {
            ImageValue::Single(self.previews.first().cloned().unwrap_or_default())
        }
    }

    /// Display state of the file picker
    pub fn picker(&self) -> PickerState {
        let count = self.previews.len();
        let has_room = if self.options.multiple {
            count < self.options.max_images
        } else {
            count == 0
        };

        PickerState {
            enabled: !self.is_uploading() && has_room,
            accept: self.options.accept.clone(),
            label: self.options.label.clone(),
            count,
            max: self.options.multiple.then_some(self.options.max_images),
        }
    }

    /// Validate and upload a batch of selected files
    ///
    /// The selection is consumed, so the picker always starts empty again
    /// whatever the outcome.
    pub async fn select_files(&mut self, files: Vec<SelectedFile>) -> UploadOutcome {
        if files.is_empty() {
            return UploadOutcome::Ignored;
        }

        if let Some(message) = self.check_batch(files.len()) {
            self.notifier.error(&message);
            return UploadOutcome::Rejected { message };
        }

        let _guard = UploadingGuard::enter(&self.uploading);
        self.upload_batch(files).await
    }

    /// Remove the image at `index`; returns false when out of range
    ///
    /// Only local state changes; the hosted file is left alone.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.previews.len() {
            return false;
        }

        self.previews.remove(index);
        self.emit_change();
        true
    }

    fn check_batch(&self, incoming: usize) -> Option<String> {
        if self.options.multiple {
            if self.previews.len() + incoming > self.options.max_images {
                return Some(format!(
                    "Maximum {} images allowed",
                    self.options.max_images
                ));
            }
        } else if incoming > 1 {
            return Some("Please select only one image".to_string());
        }
        None
    }

    fn check_file(&self, file: &SelectedFile) -> Option<(SkipReason, String)> {
        if !file.is_image() {
            return Some((
                SkipReason::NotAnImage,
                format!("{} is not an image file", file.name),
            ));
        }

        if file.size > self.settings.max_file_size_bytes {
            return Some((
                SkipReason::TooLarge,
                format!(
                    "{} is too large. Maximum size is {}",
                    file.name,
                    size_label(self.settings.max_file_size_bytes)
                ),
            ));
        }

        None
    }

    async fn upload_batch(&mut self, files: Vec<SelectedFile>) -> UploadOutcome {
        let mut uploaded = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            if let Some((reason, message)) = self.check_file(&file) {
                debug!("Skipping {}: {:?}", file.name, reason);
                self.notifier.error(&message);
                skipped.push(SkippedFile {
                    name: file.name,
                    reason,
                });
                continue;
            }

            match upload_file(&self.client, &self.settings, &file).await {
                Ok(Some(url)) => uploaded.push(url),
                Ok(None) => debug!("No URL in upload response for {}, dropping it", file.name),
                Err(e) => {
                    warn!("Upload of {} failed: {e}", file.name);
                    let message = e.user_message(UPLOAD_FAILED_MESSAGE);
                    self.notifier.error(&message);
                    return UploadOutcome::Failed { message, skipped };
                }
            }
        }

        if !uploaded.is_empty() {
            if self.options.multiple {
                self.previews.extend(uploaded.iter().cloned());
            } else {
                self.previews.clone_from(&uploaded);
            }
            self.emit_change();

            let noun = if uploaded.len() == 1 { "image" } else { "images" };
            self.notifier
                .success(&format!("{} {noun} uploaded successfully", uploaded.len()));
            info!("Uploaded {} {noun}", uploaded.len());
        }

        UploadOutcome::Completed { uploaded, skipped }
    }

    fn emit_change(&mut self) {
        let value = self.value();
        if let Some(listener) = self.on_change.as_mut() {
            listener(&value);
        }
    }
}

/// Human-readable size limit: "5MB", "512KB"
fn size_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Send one file and pull the hosted URL out of the response
async fn upload_file(
    client: &ApiClient,
    settings: &UploadSettings,
    file: &SelectedFile,
) -> Result<Option<String>> {
    let part = FilePart::new(
        settings.field_name.clone(),
        file.name.clone(),
        file.content_type.clone(),
        file.data.clone(),
    );
    let response = client.upload(&settings.path, part).await?;
    // A body that is not JSON simply has no URL in it
    let body = response.value().unwrap_or(JsonValue::Null);
    Ok(extract_url(&body))
}

impl std::fmt::Debug for ImageUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploader")
            .field("options", &self.options)
            .field("previews", &self.previews)
            .field("uploading", &self.is_uploading())
            .finish_non_exhaustive()
    }
}
