// # WMO Weather Source
//
// This crate provides the WMO World Weather Information Service source for
// the weather add-on.
//
// ## Endpoints
//
// - `present.xml`: current conditions for every city (JSON, despite the name)
// - `<city_id>_en.json`: daily forecast for one city
//
// ## Architecture
//
// Each call performs one GET with a short timeout and decodes the body with
// the weather-core document types. There is no caching and no retry; the
// poller decides when to ask again.

use std::time::Duration;

use weather_core::snapshot::{CurrentReport, ForecastReport};
use weather_core::traits::WeatherSource;
use weather_core::{Error, Result};

/// Public WMO JSON feed
pub const DEFAULT_BASE_URL: &str = "https://worldweather.wmo.int/en/json/";

/// Per-request timeout
const REQUEST_TIMEOUT_SECS: u64 = 3;

/// Longest error body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// WMO World Weather JSON source
#[derive(Debug, Clone)]
pub struct WmoWeatherSource {
    /// Base URL, always ending in `/`
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl WmoWeatherSource {
    /// Source pointing at the public WMO feed
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Source pointing at a mirror or test server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            base_url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_url(&self) -> String {
        format!("{}present.xml", self.base_url)
    }

    fn forecast_url(&self, city_id: u32) -> String {
        format!("{}{}_en.json", self.base_url, city_id)
    }

    /// GET a URL and return the body of a successful response
    async fn fetch_body(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(Error::http(format!(
                "{} returned {}: {}",
                url,
                status,
                truncate_body(&error_text)
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read response from {}: {}", url, e)))
    }
}

impl Default for WmoWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WeatherSource for WmoWeatherSource {
    async fn current_conditions(&self) -> Result<CurrentReport> {
        let body = self.fetch_body(&self.current_url()).await?;
        let report = CurrentReport::from_json(&body)?;
        tracing::debug!("Current conditions for {} cities", report.len());
        Ok(report)
    }

    async fn forecast(&self, city_id: u32) -> Result<ForecastReport> {
        let body = self.fetch_body(&self.forecast_url(city_id)).await?;
        let report = ForecastReport::from_json(&body)?;
        tracing::debug!("Forecast for city {} has {} day(s)", city_id, report.days().len());
        Ok(report)
    }

    fn source_name(&self) -> &'static str {
        "wmo"
    }
}

/// Trim an error body to a loggable length on a char boundary
fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }

    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
