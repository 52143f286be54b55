// # weather-core
//
// Core library for the Candle weather gateway add-on.
//
// ## Architecture Overview
//
// The add-on polls a public weather feed and exposes the readings as
// properties on two virtual devices owned by a host gateway:
// - **WeatherSource**: Trait for fetching the upstream weather documents
// - **GatewayHost**: Trait the gateway implements to receive registrations and change notifications
// - **SettingsStore**: Trait for the add-on preferences the gateway keeps
// - **PropertyRegistry**: Lazy lookup-or-create of device properties
// - **Synchronizer**: Applies a weather snapshot to the devices
// - **Poller**: Timed fetch-and-update loop
//
// ## Design Principles
//
// 1. **Composition over host inheritance**: devices are plain data; the gateway is reached through a trait
// 2. **Additive properties**: a property is created once and never removed or re-typed
// 3. **Equality-gated updates**: the gateway only hears about values that changed
// 4. **Partial data tolerance**: a missing field or failed section never clears existing values

pub mod compass;
pub mod config;
pub mod device;
pub mod error;
pub mod poller;
pub mod registry;
pub mod settings;
pub mod snapshot;
pub mod sync;
pub mod traits;
pub mod units;

// Re-export core types for convenience
pub use config::{Settings, UnitSystem, WeatherConfig};
pub use device::{Device, DeviceSlot, Devices, Property, PropertySchema, PropertyValue, ValueType};
pub use error::{Error, Result};
pub use poller::{Poller, PollerEvent, PollerState, Section, StopHandle};
pub use registry::PropertyRegistry;
pub use settings::{FileSettingsStore, MemorySettingsStore, load_config};
pub use snapshot::{CityConditions, CurrentReport, ForecastDay, ForecastReport, WeatherSnapshot};
pub use sync::{SyncReport, Synchronizer};
pub use traits::{GatewayHost, SettingsStore, WeatherSource};
