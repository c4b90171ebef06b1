//! Session module
//!
//! Holds the pieces of client-side session state the HTTP client depends on:
//!
//! - `TokenStore` - where the bearer token lives (memory or a JSON file)
//! - `Navigator` - the current route, used to send the user to the login
//!   page once the server rejects the session

mod navigator;
mod store;

pub use navigator::{MemoryNavigator, Navigator};
pub use store::{FileTokenStore, MemoryTokenStore, StoredToken, TokenStore};
