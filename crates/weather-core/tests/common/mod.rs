//! Test doubles and common utilities for contract tests
//!
//! This module provides a scriptable weather source and a gateway host that
//! records every call it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use weather_core::device::{Device, Property, PropertyValue};
use weather_core::error::{Error, Result};
use weather_core::snapshot::{CurrentReport, ForecastReport};
use weather_core::traits::{GatewayHost, WeatherSource};

/// A weather source whose documents can be swapped between cycles
///
/// Clones share documents and counters, so a test can keep one handle after
/// boxing another into the poller.
#[derive(Clone, Default)]
pub struct ScriptedWeatherSource {
    /// Current-conditions body; `None` makes the fetch fail
    current: Arc<Mutex<Option<Value>>>,
    /// Forecast body; `None` makes the fetch fail
    forecast: Arc<Mutex<Option<Value>>>,
    /// Call counter for current_conditions()
    current_calls: Arc<AtomicUsize>,
    /// Call counter for forecast()
    forecast_calls: Arc<AtomicUsize>,
    /// City ids passed to forecast()
    forecast_cities: Arc<Mutex<Vec<u32>>>,
}

impl ScriptedWeatherSource {
    pub fn new(current: Value, forecast: Value) -> Self {
        let source = Self::default();
        source.set_current(Some(current));
        source.set_forecast(Some(forecast));
        source
    }

    /// A source where every fetch fails
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn set_current(&self, document: Option<Value>) {
        *self.current.lock().unwrap() = document;
    }

    pub fn set_forecast(&self, document: Option<Value>) {
        *self.forecast.lock().unwrap() = document;
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_cities(&self) -> Vec<u32> {
        self.forecast_cities.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherSource for ScriptedWeatherSource {
    async fn current_conditions(&self) -> Result<CurrentReport> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        let document = self.current.lock().unwrap().clone();
        match document {
            Some(value) => CurrentReport::from_value(value),
            None => Err(Error::fetch("connection refused")),
        }
    }

    async fn forecast(&self, city_id: u32) -> Result<ForecastReport> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.forecast_cities.lock().unwrap().push(city_id);
        let document = self.forecast.lock().unwrap().clone();
        match document {
            Some(value) => ForecastReport::from_value(value),
            None => Err(Error::fetch("connection refused")),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// One call received by the recording host
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Registered(String),
    Connected(String, bool),
    DeviceChanged(String),
    PropertyChanged {
        device: String,
        name: String,
        value: PropertyValue,
    },
}

/// A GatewayHost that records every call in order
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn device_changes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::DeviceChanged(_)))
            .count()
    }

    pub fn property_changes(&self) -> Vec<(String, String, PropertyValue)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::PropertyChanged { device, name, value } => Some((device, name, value)),
                _ => None,
            })
            .collect()
    }

    /// Device-changed plus property-changed calls
    pub fn notification_count(&self) -> usize {
        self.device_changes() + self.property_changes().len()
    }
}

impl GatewayHost for RecordingHost {
    fn register_device(&self, device: &Device) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Registered(device.id().to_string()));
    }

    fn device_connected(&self, device_id: &str, connected: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Connected(device_id.to_string(), connected));
    }

    fn device_changed(&self, device: &Device) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::DeviceChanged(device.id().to_string()));
    }

    fn property_changed(&self, device_id: &str, property: &Property) {
        self.calls.lock().unwrap().push(HostCall::PropertyChanged {
            device: device_id.to_string(),
            name: property.name().to_string(),
            value: property.value().clone(),
        });
    }
}

/// Current-conditions document with one entry for `city_id`, plus a
/// neighbouring city that must never be picked up
pub fn current_document(city_id: u32, temp: &str) -> Value {
    json!({
        "present": {
            "a1": {
                "cityId": 200,
                "wxdesc": "Snow",
                "rh": "20",
                "wd": "N",
                "ws": "9.0",
                "sunrise": "08:00",
                "sunset": "16:00",
                "temp": "-5.0",
            },
            "b2": {
                "cityId": city_id,
                "wxdesc": "Mist",
                "rh": "81",
                "wd": "SW",
                "ws": "3.5",
                "sunrise": "06:45",
                "sunset": "18:02",
                "temp": temp,
            },
        }
    })
}

/// Forecast document with the given `(weather, minTemp, maxTemp)` days
pub fn forecast_document(days: &[(&str, &str, &str)]) -> Value {
    let days: Vec<Value> = days
        .iter()
        .map(|(weather, min, max)| {
            let min_f = fahrenheit(min);
            let max_f = fahrenheit(max);
            json!({
                "weather": weather,
                "minTemp": min,
                "maxTemp": max,
                "minTempF": min_f,
                "maxTempF": max_f,
            })
        })
        .collect();

    json!({ "city": { "forecast": { "forecastDay": days } } })
}

fn fahrenheit(celsius: &str) -> String {
    let c: f64 = celsius.parse().unwrap();
    format!("{}", (c * 1.8 + 32.0).round())
}

/// A forecast with today and tomorrow
pub fn two_day_forecast() -> Value {
    forecast_document(&[("Sunny", "2", "11"), ("Showers", "4", "9")])
}
