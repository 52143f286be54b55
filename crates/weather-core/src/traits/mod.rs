//! Core traits for the weather add-on
//!
//! This module defines the interfaces to the add-on's external collaborators.
//!
//! - [`WeatherSource`]: Fetch and decode the upstream weather documents
//! - [`GatewayHost`]: Device registration and change notification
//! - [`SettingsStore`]: Add-on preferences kept by the gateway

pub mod gateway_host;
pub mod settings_store;
pub mod weather_source;

pub use gateway_host::GatewayHost;
pub use settings_store::SettingsStore;
pub use weather_source::WeatherSource;
