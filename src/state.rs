//! Shared application state for request handlers.

use std::sync::Arc;

use crate::installer::LicenseInstaller;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
#[derive(Clone)]
pub struct AppState {
    pub installer: Arc<LicenseInstaller>,
}

impl AppState {
    pub fn new(installer: LicenseInstaller) -> Self {
        Self {
            installer: Arc::new(installer),
        }
    }
}
