// # Weather Source Trait
//
// Defines the interface for retrieving the upstream weather documents.
//
// ## Implementations
//
// - WMO World Weather JSON feed: `weather-source-wmo` crate
//
// The two documents are fetched independently so that one can fail while
// the other succeeds.

use async_trait::async_trait;

use crate::snapshot::{CurrentReport, ForecastReport};

/// Trait for upstream weather data sources
///
/// Implementations own transport concerns (timeouts, status handling) and
/// decode the bodies with [`CurrentReport::from_json`] and
/// [`ForecastReport::from_json`].
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the global current-conditions document
    ///
    /// # Returns
    ///
    /// - `Ok(CurrentReport)`: decoded document
    /// - `Err(Error)`: fetch, status or parse failure
    async fn current_conditions(&self) -> Result<CurrentReport, crate::Error>;

    /// Fetch the daily forecast for one city
    async fn forecast(&self, city_id: u32) -> Result<ForecastReport, crate::Error>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}
