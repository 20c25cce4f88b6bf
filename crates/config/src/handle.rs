//! Shared read-only configuration with atomic replacement

use crate::loader::ConfigLoader;
use crate::schema::Config;
use anyhow::Result;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Cloneable handle to the current configuration.
///
/// Readers take a snapshot with [`SharedConfig::current`] and keep using it
/// for as long as they like; a reload swaps in a whole new [`Config`].
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<Config>>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Snapshot of the configuration currently installed
    pub fn current(&self) -> Arc<Config> {
        // the lock only guards a pointer swap, so a poisoned guard still holds a whole Config
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Validate `config` and install it; the previous configuration stays on failure
    pub fn replace(&self, config: Config) -> Result<Arc<Config>> {
        ConfigLoader::validate(&config)?;
        Ok(self.install(config))
    }

    /// Reload from `path` and install the result; the previous configuration stays on failure
    pub fn reload_from<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Config>> {
        let config = ConfigLoader::load(path)?;
        Ok(self.install(config))
    }

    fn install(&self, config: Config) -> Arc<Config> {
        let next = Arc::new(config);
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&next);
        info!("Configuration replaced");
        next
    }
}

impl From<Config> for SharedConfig {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}
