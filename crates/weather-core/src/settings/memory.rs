// # Memory Settings Store
//
// In-memory implementation of SettingsStore, for tests and for embedding the
// add-on where preferences come from elsewhere.

use async_trait::async_trait;

use crate::Error;
use crate::config::Settings;
use crate::traits::SettingsStore;

/// In-memory settings store
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    settings: Option<Settings>,
}

impl MemorySettingsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `settings`
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<Settings>, Error> {
        Ok(self.settings.clone())
    }
}
