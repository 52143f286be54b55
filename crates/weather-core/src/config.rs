//! Configuration types for the weather add-on
//!
//! The configuration is resolved once at startup from the gateway's add-on
//! preferences and is read-only for the rest of the process lifetime.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Raw add-on preferences as stored by the gateway
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Preference key for the debug flag
pub const KEY_DEBUGGING: &str = "Debugging";
/// Preference key for the location (WMO city code)
pub const KEY_NEAREST_CITY: &str = "Nearest city";
/// Preference key for the unit system
pub const KEY_METRIC: &str = "Metric";
/// Preference key for the poll interval, in hours
pub const KEY_UPDATE_FREQUENCY: &str = "Update frequency";

const SECS_PER_HOUR: u64 = 3600;

/// Unit system used for temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Celsius
    #[default]
    Metric,
    /// Fahrenheit
    Imperial,
}

impl UnitSystem {
    pub fn is_metric(self) -> bool {
        matches!(self, UnitSystem::Metric)
    }

    /// Unit name used in temperature property schemas
    pub fn temperature_unit(self) -> &'static str {
        match self {
            UnitSystem::Metric => "degree celsius",
            UnitSystem::Imperial => "degree fahrenheit",
        }
    }
}

/// Main weather configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// WMO city code whose data is exposed
    #[serde(default = "default_location_id")]
    pub location_id: u32,

    /// Unit system for temperatures
    #[serde(default)]
    pub units: UnitSystem,

    /// Seconds between fetch-and-update cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Verbose logging
    #[serde(default)]
    pub debug: bool,
}

impl WeatherConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            location_id: default_location_id(),
            units: UnitSystem::default(),
            poll_interval_secs: default_poll_interval_secs(),
            debug: false,
        }
    }

    pub fn with_location(mut self, location_id: u32) -> Self {
        self.location_id = location_id;
        self
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn is_metric(&self) -> bool {
        self.units.is_metric()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.location_id == 0 {
            return Err(crate::Error::config("Location id must be > 0"));
        }
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }
        Ok(())
    }

    /// Resolve a configuration from the gateway preferences.
    ///
    /// Each key is read independently. A missing or malformed key keeps
    /// its default.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::new();

        match settings.get(KEY_DEBUGGING).map(as_bool) {
            Some(Some(debug)) => config.debug = debug,
            Some(None) => debug!("Ignoring malformed '{}' preference", KEY_DEBUGGING),
            None => {}
        }

        match settings.get(KEY_NEAREST_CITY).map(city_code) {
            Some(Some(code)) => config.location_id = code,
            Some(None) => debug!(
                "Could not resolve '{}' preference, using city {}",
                KEY_NEAREST_CITY, config.location_id
            ),
            None => debug!("Nearest city preference not found in settings"),
        }

        match settings.get(KEY_METRIC).map(as_bool) {
            Some(Some(true)) => config.units = UnitSystem::Metric,
            Some(Some(false)) => config.units = UnitSystem::Imperial,
            Some(None) => debug!("Ignoring malformed '{}' preference", KEY_METRIC),
            None => debug!("Metric preference not found in settings"),
        }

        let interval_secs = |value: &serde_json::Value| {
            as_hours(value).and_then(|hours| hours.checked_mul(SECS_PER_HOUR))
        };
        match settings.get(KEY_UPDATE_FREQUENCY).map(interval_secs) {
            Some(Some(secs)) => config.poll_interval_secs = secs,
            Some(None) => debug!("Ignoring malformed '{}' preference", KEY_UPDATE_FREQUENCY),
            None => debug!("Update frequency preference not found in settings"),
        }

        config
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// De Bilt, NL
fn default_location_id() -> u32 {
    144
}

fn default_poll_interval_secs() -> u64 {
    SECS_PER_HOUR
}

fn as_bool(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_i64().map(|n| n != 0),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_hours(value: &serde_json::Value) -> Option<u64> {
    let hours = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (hours > 0).then_some(hours)
}

/// Accepts `144`, `"144"` or a dropdown label ending in `(144)`.
fn city_code(value: &serde_json::Value) -> Option<u32> {
    let code = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<u32>().ok().or_else(|| {
                let inner = s.strip_suffix(')')?;
                let start = inner.rfind('(')?;
                inner[start + 1..].trim().parse::<u32>().ok()
            })
        }
        _ => None,
    }?;
    (code > 0).then_some(code)
}
