//! Shared state handed to every handler through the `State` extractor.
//!
//! Immutable after startup: the filesystem is the only shared mutable
//! resource.

use lumen_core::config::LumenConfig;
use lumen_core::error::LumenError;
use lumen_scan::Library;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<LumenConfig>,
    pub library: Arc<Library>,
}

impl AppState {
    /// Prepare the media root and wrap the configuration for sharing.
    pub fn new(config: LumenConfig) -> Result<Self, LumenError> {
        config.validate()?;
        let library = Library::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            library: Arc::new(library),
        })
    }
}
