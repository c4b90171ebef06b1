//! Navigation abstraction
//!
//! The client only needs to know where the user currently is and to send
//! them to the login page when the session expires.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Current route of the dashboard
pub trait Navigator: Send + Sync {
    /// Path the user is currently on
    fn current_location(&self) -> String;

    /// Navigate to `path`
    fn redirect(&self, path: &str);
}

#[derive(Debug)]
struct NavState {
    location: String,
    redirects: Vec<String>,
}

/// Navigator that keeps the location in memory and records redirects
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

impl MemoryNavigator {
    /// Create a navigator positioned at `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavState {
                location: location.into(),
                redirects: Vec::new(),
            }),
        }
    }

    /// Move to `location` without recording a redirect
    pub fn visit(&self, location: impl Into<String>) {
        self.lock().location = location.into();
    }

    /// Redirects performed so far, oldest first
    pub fn redirects(&self) -> Vec<String> {
        self.lock().redirects.clone()
    }

    fn lock(&self) -> MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> String {
        self.lock().location.clone()
    }

    fn redirect(&self, path: &str) {
        info!("Redirecting to {}", path);
        let mut state = self.lock();
        state.location = path.to_string();
        state.redirects.push(path.to_string());
    }
}
