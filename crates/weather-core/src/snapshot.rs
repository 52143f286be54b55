//! Upstream weather documents
//!
//! The WMO feed encodes most leaves as strings (`"temp": "10.5"`) but is not
//! consistent about it, so every leaf is kept as a raw JSON value and decoded
//! leniently when a field is read. A field that cannot be decoded reads as
//! `None` and is skipped for the cycle.

use serde::Deserialize;
use serde_json::Value;

use crate::config::UnitSystem;
use crate::error::{Error, Result};

/// Current-conditions document, keyed by opaque per-city keys
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentReport {
    present: serde_json::Map<String, Value>,
}

impl CurrentReport {
    /// Decode the current-conditions document.
    ///
    /// Fails when the body is not JSON or lacks the `present` key.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::parse(format!("current conditions document: {e}")))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::parse(format!("current conditions document: {e}")))
    }

    /// Number of city entries in the document
    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// First entry whose city id equals `city_id`.
    ///
    /// Entries that cannot be decoded or carry no usable city id are skipped.
    pub fn find_city(&self, city_id: u32) -> Option<CityConditions> {
        for (key, entry) in &self.present {
            let city: CityConditions = match serde_json::from_value(entry.clone()) {
                Ok(city) => city,
                Err(e) => {
                    tracing::debug!("Skipping undecodable city entry {}: {}", key, e);
                    continue;
                }
            };

            match city.city_id() {
                Some(id) if id == city_id => {
                    tracing::debug!("Found city {} under key {}", city_id, key);
                    return Some(city);
                }
                Some(_) => {}
                None => tracing::debug!("No cityId in city entry {}", key),
            }
        }
        None
    }
}

/// Current conditions for one city
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityConditions {
    #[serde(rename = "cityId", default)]
    city_id: Option<Value>,
    #[serde(default)]
    wxdesc: Option<Value>,
    #[serde(default)]
    rh: Option<Value>,
    #[serde(default)]
    wd: Option<Value>,
    #[serde(default)]
    ws: Option<Value>,
    #[serde(default)]
    sunrise: Option<Value>,
    #[serde(default)]
    sunset: Option<Value>,
    #[serde(default)]
    temp: Option<Value>,
}

impl CityConditions {
    pub fn city_id(&self) -> Option<u32> {
        let id = lenient_f64(self.city_id.as_ref()?)?;
        (id >= 0.0 && id.fract() == 0.0 && id <= f64::from(u32::MAX)).then_some(id as u32)
    }

    /// Weather text, e.g. "Mist"
    pub fn description(&self) -> Option<String> {
        lenient_text(self.wxdesc.as_ref()?)
    }

    /// Relative humidity, percent
    pub fn humidity(&self) -> Option<f64> {
        lenient_f64(self.rh.as_ref()?)
    }

    /// Wind direction code, e.g. "SW"
    pub fn wind_direction(&self) -> Option<String> {
        lenient_text(self.wd.as_ref()?)
    }

    pub fn wind_speed(&self) -> Option<f64> {
        lenient_f64(self.ws.as_ref()?)
    }

    /// Sunrise as `HH:MM`
    pub fn sunrise(&self) -> Option<String> {
        lenient_text(self.sunrise.as_ref()?)
    }

    /// Sunset as `HH:MM`
    pub fn sunset(&self) -> Option<String> {
        lenient_text(self.sunset.as_ref()?)
    }

    /// Temperature in Celsius
    pub fn temperature(&self) -> Option<f64> {
        lenient_f64(self.temp.as_ref()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastDocument {
    city: ForecastCity,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastCity {
    forecast: ForecastBlock,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastBlock {
    #[serde(rename = "forecastDay")]
    forecast_day: Vec<ForecastDay>,
}

/// Per-city daily forecast; index 0 is today, index 1 tomorrow
#[derive(Debug, Clone)]
pub struct ForecastReport {
    days: Vec<ForecastDay>,
}

impl ForecastReport {
    /// Decode the forecast document.
    ///
    /// Fails when the body is not JSON or lacks the
    /// `city.forecast.forecastDay` path.
    pub fn from_json(body: &str) -> Result<Self> {
        let document: ForecastDocument = serde_json::from_str(body)
            .map_err(|e| Error::parse(format!("forecast document: {e}")))?;
        Ok(Self::from_days(document.city.forecast.forecast_day))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let document: ForecastDocument = serde_json::from_value(value)
            .map_err(|e| Error::parse(format!("forecast document: {e}")))?;
        Ok(Self::from_days(document.city.forecast.forecast_day))
    }

    pub fn from_days(days: Vec<ForecastDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[ForecastDay] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Option<&ForecastDay> {
        self.days.get(index)
    }
}

/// One daily forecast record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastDay {
    #[serde(default)]
    weather: Option<Value>,
    #[serde(rename = "minTemp", default)]
    min_temp: Option<Value>,
    #[serde(rename = "maxTemp", default)]
    max_temp: Option<Value>,
    #[serde(rename = "minTempF", default)]
    min_temp_f: Option<Value>,
    #[serde(rename = "maxTempF", default)]
    max_temp_f: Option<Value>,
}

impl ForecastDay {
    /// Forecast text; may be empty
    pub fn weather(&self) -> Option<String> {
        lenient_text(self.weather.as_ref()?)
    }

    /// Minimum temperature, selected (not converted) by unit system
    pub fn min_temp(&self, units: UnitSystem) -> Option<f64> {
        let raw = match units {
            UnitSystem::Metric => self.min_temp.as_ref(),
            UnitSystem::Imperial => self.min_temp_f.as_ref(),
        };
        lenient_f64(raw?)
    }

    /// Maximum temperature, selected (not converted) by unit system
    pub fn max_temp(&self, units: UnitSystem) -> Option<f64> {
        let raw = match units {
            UnitSystem::Metric => self.max_temp.as_ref(),
            UnitSystem::Imperial => self.max_temp_f.as_ref(),
        };
        lenient_f64(raw?)
    }
}

/// One fetch cycle's result
///
/// Either section is `None` when its fetch or decode failed.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    pub current: Option<CurrentReport>,
    pub forecast: Option<ForecastReport>,
}

impl WeatherSnapshot {
    pub fn new(current: Option<CurrentReport>, forecast: Option<ForecastReport>) -> Self {
        Self { current, forecast }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.forecast.is_none()
    }
}

/// Number, or a string holding a number
fn lenient_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// String, or a number rendered as text
fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_report_requires_present_key() {
        let err = CurrentReport::from_json(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let err = CurrentReport::from_json("<html>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn find_city_matches_numeric_and_string_ids() {
        let report = CurrentReport::from_value(json!({
            "present": {
                "a": { "cityId": "200", "temp": "5.0" },
                "b": { "cityId": 144, "temp": "10.5" },
            }
        }))
        .unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.find_city(144).unwrap().temperature(), Some(10.5));
        assert_eq!(report.find_city(200).unwrap().temperature(), Some(5.0));
        assert!(report.find_city(999).is_none());
    }

    #[test]
    fn find_city_takes_first_match_in_document_order() {
        let report = CurrentReport::from_json(
            r#"{"present":{"z":{"cityId":144,"temp":"1.0"},"a":{"cityId":144,"temp":"2.0"}}}"#,
        )
        .unwrap();

        assert_eq!(report.find_city(144).unwrap().temperature(), Some(1.0));
    }

    #[test]
    fn find_city_skips_broken_entries() {
        let report = CurrentReport::from_value(json!({
            "present": {
                "a": "not an object",
                "b": { "temp": "1.0" },
                "c": { "cityId": "abc" },
                "d": { "cityId": 144, "wxdesc": "Mist" },
            }
        }))
        .unwrap();

        let city = report.find_city(144).unwrap();
        assert_eq!(city.description().as_deref(), Some("Mist"));
    }

    #[test]
    fn lenient_leaves() {
        let city: CityConditions = serde_json::from_value(json!({
            "cityId": 144,
            "rh": " 81 ",
            "ws": 3.5,
            "temp": "n/a",
            "wd": null,
        }))
        .unwrap();

        assert_eq!(city.humidity(), Some(81.0));
        assert_eq!(city.wind_speed(), Some(3.5));
        assert_eq!(city.temperature(), None);
        assert_eq!(city.wind_direction(), None);
        assert_eq!(city.sunrise(), None);
    }

    #[test]
    fn forecast_requires_full_path() {
        assert!(ForecastReport::from_value(json!({ "city": {} })).is_err());
        assert!(ForecastReport::from_value(json!({ "city": { "forecast": {} } })).is_err());

        let report = ForecastReport::from_value(json!({
            "city": { "forecast": { "forecastDay": [] } }
        }))
        .unwrap();
        assert!(report.days().is_empty());
    }

    #[test]
    fn forecast_selects_unit_fields() {
        let report = ForecastReport::from_json(
            r#"{"city":{"forecast":{"forecastDay":[
                {"weather":"Sunny","minTemp":"2","maxTemp":"11","minTempF":"36","maxTempF":"52"}
            ]}}}"#,
        )
        .unwrap();

        let today = report.day(0).unwrap();
        assert_eq!(today.weather().as_deref(), Some("Sunny"));
        assert_eq!(today.min_temp(UnitSystem::Metric), Some(2.0));
        assert_eq!(today.max_temp(UnitSystem::Metric), Some(11.0));
        assert_eq!(today.min_temp(UnitSystem::Imperial), Some(36.0));
        assert_eq!(today.max_temp(UnitSystem::Imperial), Some(52.0));
        assert!(report.day(1).is_none());
    }
}
