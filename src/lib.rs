// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Content Admin
//!
//! Client toolkit for the content admin dashboard API: an authenticated
//! HTTP client with rate-limit recovery, and the multi-image upload widget
//! used by the dashboard forms.
//!
//! ## Features
//!
//! - **Bearer Auth**: Session token attached to every request
//! - **429 Recovery**: Retry-After aware backoff, bounded per endpoint
//! - **Session Expiry**: 401 clears the token and redirects to login
//! - **Image Upload**: Batch validation, sequential upload, URL extraction
//! - **Resources**: CRUD helpers for books, colleges, users and the rest
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use content_admin::http::{ApiClient, ApiClientConfig};
//! use content_admin::notify::TracingNotifier;
//! use content_admin::session::{FileTokenStore, MemoryNavigator};
//! use content_admin::upload::{ImageUploader, SelectedFile, UploadOptions};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> content_admin::Result<()> {
//!     let client = Arc::new(ApiClient::new(
//!         ApiClientConfig::default(),
//!         Arc::new(FileTokenStore::new("token.json")),
//!         Arc::new(MemoryNavigator::new("/books/new")),
//!     )?);
//!
//!     let mut uploader = ImageUploader::new(
//!         client,
//!         Arc::new(TracingNotifier),
//!         UploadOptions::multiple(5),
//!     );
//!
//!     let cover = SelectedFile::from_path("cover.png").await?;
//!     uploader.select_files(vec![cover]).await;
//!     println!("{:?}", uploader.value());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        ImageUploader            ResourceApi        CLI        │
//! └───────────────┬──────────────────────┬────────────────────────┘
//!                 │                      │
//! ┌───────────────┴──────────────────────┴────────────────────────┐
//! │                         ApiClient                             │
//! │  interceptors → dispatch → 2xx / 429 retry / 401 expire       │
//! └──────────┬───────────────┬────────────────┬───────────────────┘
//!            │               │                │
//!      TokenStore       RetryLedger       Navigator
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the toolkit
pub mod error;

/// Common types and type aliases
pub mod types;

/// Session token storage and navigation
pub mod session;

/// User-facing notifications
pub mod notify;

/// HTTP client with retry and session handling
pub mod http;

/// Image upload widget
pub mod upload;

/// Dashboard resource collections
pub mod resources;

/// Configuration loading
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::AdminConfig;
pub use http::{ApiClient, ApiClientConfig};
pub use upload::{ImageUploader, UploadOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
