// # Settings Store Implementations
//
// This module provides implementations of the SettingsStore trait.

pub mod file;
pub mod memory;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;

use crate::config::WeatherConfig;
use crate::traits::SettingsStore;

/// Resolve the startup configuration from a settings store.
///
/// Never fails: an unreadable store or missing preferences fall back to the
/// defaults. The error, if any, is returned alongside so the caller can log
/// it once logging is set up.
pub async fn load_config(store: &dyn SettingsStore) -> (WeatherConfig, Option<crate::Error>) {
    match store.load().await {
        Ok(Some(settings)) => (WeatherConfig::from_settings(&settings), None),
        Ok(None) => (WeatherConfig::default(), None),
        Err(e) => (WeatherConfig::default(), Some(e)),
    }
}
