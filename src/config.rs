//! Configuration for the admin toolkit
//!
//! Settings are read from a YAML file where every field is optional, then
//! overridden from the environment. The CLI applies its own flags last.

use crate::error::{Error, Result, ResultExt};
use crate::http::{ApiClientConfig, RateLimiterConfig};
use crate::types::StringMap;
use crate::upload::{UploadSettings, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_IMAGES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding `api.base_url`
pub const ENV_BASE_URL: &str = "CONTENT_ADMIN_BASE_URL";

/// Environment variable overriding `session.token_file`
pub const ENV_TOKEN_FILE: &str = "CONTENT_ADMIN_TOKEN_FILE";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete toolkit configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// API endpoint settings
    pub api: ApiConfig,

    /// Rate-limit retry settings
    pub retry: RetryConfig,

    /// Optional client-side pacing
    pub rate_limit: Option<RateLimiterConfig>,

    /// Session persistence
    pub session: SessionConfig,

    /// Image upload settings
    pub upload: UploadConfig,
}

// ============================================================================
// Sections
// ============================================================================

/// API endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    pub headers: StringMap,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
            user_agent: None,
            headers: StringMap::new(),
        }
    }
}

/// Rate-limit retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 1000,
            max_backoff_ms: 5000,
        }
    }
}

/// Session persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the CLI keeps the session token
    pub token_file: PathBuf,

    /// Route the user is sent to when the session expires
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(".content-admin/token.json"),
            login_path: "/login".to_string(),
        }
    }
}

/// Image upload settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub path: String,
    pub field_name: String,
    pub max_file_size_bytes: u64,

    /// Cap used by multi-image fields
    pub max_images: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let settings = UploadSettings::default();
        Self {
            path: settings.path,
            field_name: settings.field_name,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            max_images: DEFAULT_MAX_IMAGES,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AdminConfig {
    /// Parse YAML; an empty document gives the defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            read => read.with_context(|| format!("Failed to read config file {}", path.display()))?,
        };
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            debug!("{ENV_BASE_URL} overrides base URL");
            self.set_base_url(url)?;
        }
        if let Some(file) = lookup(ENV_TOKEN_FILE).filter(|v| !v.trim().is_empty()) {
            debug!("{ENV_TOKEN_FILE} overrides token file");
            self.session.token_file = PathBuf::from(file);
        }
        Ok(())
    }

    /// Replace the base URL after validating it
    pub fn set_base_url(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        check_base_url(&url)?;
        self.api.base_url = url;
        Ok(())
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        check_base_url(&self.api.base_url)?;

        if self.api.timeout_secs == 0 {
            return Err(Error::invalid_value("api.timeout_secs", "must be positive"));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(Error::invalid_value(
                "retry.initial_backoff_ms",
                "must not exceed retry.max_backoff_ms",
            ));
        }
        if self.upload.max_images == 0 {
            return Err(Error::invalid_value("upload.max_images", "must be positive"));
        }
        if !self.session.login_path.starts_with('/') {
            return Err(Error::invalid_value(
                "session.login_path",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    /// Settings for the API client
    pub fn to_client_config(&self) -> ApiClientConfig {
        let mut builder = ApiClientConfig::builder()
            .base_url(self.api.base_url.clone())
            .timeout(Duration::from_secs(self.api.timeout_secs))
            .max_retries(self.retry.max_retries)
            .backoff(
                Duration::from_millis(self.retry.initial_backoff_ms),
                Duration::from_millis(self.retry.max_backoff_ms),
            )
            .login_path(self.session.login_path.clone());

        if let Some(agent) = &self.api.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        for (key, value) in &self.api.headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }

    /// Settings for the upload widget
    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            path: self.upload.path.clone(),
            field_name: self.upload.field_name.clone(),
            max_file_size_bytes: self.upload.max_file_size_bytes,
        }
    }
}

fn check_base_url(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::invalid_value(
            "api.base_url",
            format!("unsupported scheme '{other}'"),
        )),
    }
}
