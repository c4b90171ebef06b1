//! CLI commands and argument parsing

use crate::resources::Resource;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Content admin dashboard CLI
#[derive(Parser, Debug)]
#[command(name = "content-admin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session token file (overrides config and environment)
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a session token
    Login {
        /// Bearer token issued by the API
        #[arg(long)]
        token: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show whether a session token is stored
    Whoami,

    /// List all items of a resource
    List {
        /// Resource name (books, products, colleges, ...)
        resource: Resource,
    },

    /// Fetch one item
    Get { resource: Resource, id: String },

    /// Create an item from inline JSON
    Create {
        resource: Resource,

        /// Item body as JSON
        #[arg(long)]
        json: String,
    },

    /// Replace an item from inline JSON
    Update {
        resource: Resource,
        id: String,

        /// Item body as JSON
        #[arg(long)]
        json: String,
    },

    /// Delete an item
    Delete { resource: Resource, id: String },

    /// Upload image files and print the resulting field value
    Upload {
        /// Image files, uploaded in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Treat the field as a multi-image field
        #[arg(long)]
        multiple: bool,

        /// Image cap for multi-image fields (defaults to the configured value)
        #[arg(long)]
        max_images: Option<usize>,
    },
}
