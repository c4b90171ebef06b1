//! CLI module
//!
//! Command-line interface for the content admin API.
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Manage the stored session token
//! - `list` / `get` / `create` / `update` / `delete` - Work with resources
//! - `upload` - Upload images and print the field value

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
