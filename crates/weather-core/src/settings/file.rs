// # File Settings Store
//
// File-based implementation of SettingsStore.
//
// ## File Format
//
// The gateway's add-on preferences object, as JSON:
//
// ```json
// {
//   "Debugging": false,
//   "Nearest city": "144",
//   "Metric": true,
//   "Update frequency": 1
// }
// ```
//
// ## Read Only
//
// The gateway owns this file. A missing file means nothing is stored yet; an
// unreadable or corrupt one is reported as an error and the caller falls back
// to the defaults.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::config::Settings;
use crate::traits::SettingsStore;

/// File-based settings store
///
/// # Example
///
/// ```rust,no_run
/// use weather_core::settings::FileSettingsStore;
/// use weather_core::traits::SettingsStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSettingsStore::new("/home/pi/.webthings/config/candle-weather.json");
///     let settings = store.load().await?;
///     println!("{:?}", settings);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the preferences; `Ok(None)` if the file does not exist
    async fn read_settings(&self) -> Result<Option<Settings>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Settings file does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::settings(format!(
                    "Failed to read settings file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let settings: Settings = serde_json::from_str(&content)?;
        Ok(Some(settings))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Option<Settings>, Error> {
        self.read_settings().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;
    use crate::settings::load_config;
    use serde_json::json;
    use tempfile::tempdir;

    fn settings(value: serde_json::Value) -> Settings {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_nothing_stored() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("candle-weather.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_preferences_are_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candle-weather.json");
        fs::write(&path, br#"{ "Metric": false, "Update frequency": 2 }"#)
            .await
            .unwrap();

        let loaded = FileSettingsStore::new(&path).load().await.unwrap();
        assert_eq!(
            loaded,
            Some(settings(json!({ "Metric": false, "Update frequency": 2 })))
        );
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candle-weather.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let store = FileSettingsStore::new(&path);
        assert!(matches!(store.load().await, Err(Error::Json(_))));

        let (config, error) = load_config(&store).await;
        assert_eq!(config, WeatherConfig::default());
        assert!(error.is_some());
    }

    #[tokio::test]
    async fn non_object_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("candle-weather.json");
        fs::write(&path, b"[1, 2, 3]").await.unwrap();

        let (config, error) = load_config(&FileSettingsStore::new(&path)).await;
        assert_eq!(config, WeatherConfig::default());
        assert!(matches!(error, Some(Error::Json(_))));
    }
}
