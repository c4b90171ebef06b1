//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::AdminConfig;
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::notify::TracingNotifier;
use crate::resources::ResourceApi;
use crate::session::{FileTokenStore, MemoryNavigator, TokenStore};
use crate::types::JsonValue;
use crate::upload::{ImageUploader, SelectedFile, UploadOptions, UploadOutcome};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its result
    pub async fn run(&self) -> Result<()> {
        let output = self.execute().await?;
        if !output.is_null() {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Ok(())
    }

    /// Run the CLI command and return what would be printed
    pub async fn execute(&self) -> Result<JsonValue> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Login { token } => self.login(&config, token).await,
            Commands::Logout => self.logout(&config).await,
            Commands::Whoami => self.whoami(&config).await,
            Commands::List { resource } => {
                let client = self.client(&config)?;
                let items = ResourceApi::new(&client).list(*resource).await?;
                Ok(JsonValue::Array(items))
            }
            Commands::Get { resource, id } => {
                let client = self.client(&config)?;
                ResourceApi::new(&client).get(*resource, id).await
            }
            Commands::Create { resource, json } => {
                let body = parse_body(json)?;
                let client = self.client(&config)?;
                let created = ResourceApi::new(&client).create(*resource, body).await?;
                info!("Created item in {resource}");
                Ok(created)
            }
            Commands::Update { resource, id, json } => {
                let body = parse_body(json)?;
                let client = self.client(&config)?;
                let updated = ResourceApi::new(&client)
                    .update(*resource, id, body)
                    .await?;
                info!("Updated {resource}/{id}");
                Ok(updated)
            }
            Commands::Delete { resource, id } => {
                let client = self.client(&config)?;
                let removed = ResourceApi::new(&client).remove(*resource, id).await?;
                info!("Deleted {resource}/{id}");
                Ok(removed)
            }
            Commands::Upload {
                files,
                multiple,
                max_images,
            } => {
                self.upload(&config, files, *multiple, *max_images)
                    .await
            }
        }
    }

    /// Config file, then environment, then flags
    fn load_config(&self) -> Result<AdminConfig> {
        let mut config = AdminConfig::load(self.cli.config.as_deref())?;

        if let Some(url) = &self.cli.base_url {
            config.set_base_url(url.clone())?;
        }
        if let Some(path) = &self.cli.token_file {
            config.session.token_file.clone_from(path);
        }

        debug!("Using API at {}", config.api.base_url);
        Ok(config)
    }

    fn token_store(config: &AdminConfig) -> FileTokenStore {
        FileTokenStore::new(&config.session.token_file)
    }

    fn client(&self, config: &AdminConfig) -> Result<ApiClient> {
        ApiClient::new(
            config.to_client_config(),
            Arc::new(Self::token_store(config)),
            Arc::new(MemoryNavigator::new("/dashboard")),
        )
    }

    async fn login(&self, config: &AdminConfig, token: &str) -> Result<JsonValue> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::validation("Token must not be empty"));
        }

        let store = Self::token_store(config);
        store.save(token).await?;
        info!("Session token stored at {}", store.path().display());
        Ok(JsonValue::Null)
    }

    async fn logout(&self, config: &AdminConfig) -> Result<JsonValue> {
        Self::token_store(config).clear().await?;
        info!("Logged out");
        Ok(JsonValue::Null)
    }

    async fn whoami(&self, config: &AdminConfig) -> Result<JsonValue> {
        let store = Self::token_store(config);
        let record = store.load_record().await?;

        Ok(json!({
            "logged_in": record.is_some(),
            "saved_at": record.map(|r| r.saved_at),
            "token_file": store.path().display().to_string(),
            "base_url": config.api.base_url,
        }))
    }

    async fn upload(
        &self,
        config: &AdminConfig,
        paths: &[PathBuf],
        multiple: bool,
        max_images: Option<usize>,
    ) -> Result<JsonValue> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(SelectedFile::from_path(path).await?);
        }

        let options = if multiple {
            UploadOptions::multiple(max_images.unwrap_or(config.upload.max_images))
        } else {
            UploadOptions::single()
        };

        let client = Arc::new(self.client(config)?);
        let mut uploader = ImageUploader::new(client, Arc::new(TracingNotifier), options)
            .with_settings(config.upload_settings());

        match uploader.select_files(files).await {
            UploadOutcome::Completed { uploaded, skipped } => Ok(json!({
                "value": uploader.value(),
                "uploaded": uploaded,
                "skipped": skipped.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            })),
            UploadOutcome::Rejected { message } => Err(Error::validation(message)),
            UploadOutcome::Failed { message, .. } => Err(Error::upload(message)),
            UploadOutcome::Ignored => Ok(JsonValue::Null),
        }
    }
}

fn parse_body(raw: &str) -> Result<JsonValue> {
    let body: JsonValue = serde_json::from_str(raw)?;
    if !body.is_object() {
        return Err(Error::validation("Request body must be a JSON object"));
    }
    Ok(body)
}
