// # Settings Store Trait
//
// The gateway keeps each add-on's preferences as a JSON object. The add-on
// reads them once at startup and never writes them.

use async_trait::async_trait;

use crate::config::Settings;

/// Read-only access to the stored preferences
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the stored preferences
    ///
    /// # Returns
    ///
    /// - `Ok(Some(settings))`: preferences found
    /// - `Ok(None)`: nothing stored yet
    /// - `Err(Error)`: the store could not be read
    async fn load(&self) -> Result<Option<Settings>, crate::Error>;
}
