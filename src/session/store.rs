//! Session token storage
//!
//! Provides in-memory and file-backed token stores. The file store keeps
//! the token between CLI invocations and writes atomically.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A stored session token with the time it was saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// The bearer token
    pub token: String,
    /// When the token was stored
    pub saved_at: DateTime<Utc>,
}

impl StoredToken {
    /// Create a token record stamped with the current time
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Persistent client-side storage for the session token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored token record, if any
    async fn load_record(&self) -> Result<Option<StoredToken>>;

    /// Store a token, replacing any previous one
    async fn save(&self, token: &str) -> Result<()>;

    /// Delete the stored token
    async fn clear(&self) -> Result<()>;

    /// Load just the token string
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.load_record().await?.map(|record| record.token))
    }
}

/// Token store held in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<StoredToken>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(StoredToken::new(token))),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load_record(&self) -> Result<Option<StoredToken>> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(StoredToken::new(token));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Token store persisted as a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load_record(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::session(format!("Failed to read token file: {e}")))?;

        // An unreadable record is treated as no session
        let record: StoredToken = match serde_json::from_str(&contents) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring corrupt token file {}: {e}", self.path.display());
                return Ok(None);
            }
        };

        if record.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn save(&self, token: &str) -> Result<()> {
        let contents = serde_json::to_string_pretty(&StoredToken::new(token))
            .map_err(|e| Error::session(format!("Failed to serialize token: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::session(format!("Failed to create token directory: {e}")))?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::session(format!("Failed to write token file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::session(format!("Failed to rename token file: {e}")))?;

        debug!("Stored session token at {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed session token at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::session(format!("Failed to remove token file: {e}"))),
        }
    }
}
