//! Snapshot-to-property synchronizer
//!
//! The Synchronizer walks the field catalog for one snapshot and applies
//! the ensure-and-update rule to every field:
//!
//! 1. Extract the field's value; skip the field if it is missing or does
//!    not convert. Nothing is cleared and sibling fields still run.
//! 2. Ensure the property exists, creating it with this first value.
//! 3. Update the property; the host hears about it only if the value
//!    actually changed.
//!
//! Running the same snapshot twice therefore produces no notifications the
//! second time.

pub mod fields;

use std::sync::Arc;

use tracing::debug;

use crate::config::WeatherConfig;
use crate::device::Devices;
use crate::registry::PropertyRegistry;
use crate::snapshot::{CurrentReport, ForecastReport, WeatherSnapshot};
use crate::traits::GatewayHost;

pub use fields::{CURRENT_FIELDS, EMPTY_FORECAST_TEXT, FORECAST_FIELDS, FieldDescriptor};

/// Outcome of applying one snapshot (or one section of it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Properties created this cycle
    pub created: usize,
    /// Existing properties whose value changed
    pub updated: usize,
    /// Existing properties that already held the value
    pub unchanged: usize,
    /// Fields with no usable value this cycle
    pub skipped: usize,
}

impl SyncReport {
    /// Notifications sent to the host (property additions plus value changes)
    pub fn changed(&self) -> usize {
        self.created + self.updated
    }

    pub fn merge(&mut self, other: SyncReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
    }
}

/// Applies weather snapshots to the two devices
#[derive(Clone)]
pub struct Synchronizer {
    config: WeatherConfig,
    registry: PropertyRegistry,
}

impl Synchronizer {
    pub fn new(config: WeatherConfig, host: Arc<dyn GatewayHost>) -> Self {
        Self {
            config,
            registry: PropertyRegistry::new(host),
        }
    }

    /// Apply every section present in the snapshot
    pub fn apply(&self, devices: &mut Devices, snapshot: &WeatherSnapshot) -> SyncReport {
        let mut report = SyncReport::default();

        if let Some(current) = &snapshot.current {
            report.merge(self.apply_current(devices, current));
        }
        if let Some(forecast) = &snapshot.forecast {
            report.merge(self.apply_forecast(devices, forecast));
        }

        report
    }

    /// Apply the configured city's current conditions.
    ///
    /// When no entry matches the configured location nothing is updated.
    pub fn apply_current(&self, devices: &mut Devices, current: &CurrentReport) -> SyncReport {
        let mut report = SyncReport::default();

        match current.find_city(self.config.location_id) {
            Some(city) => self.apply_fields(devices, CURRENT_FIELDS, &city, &mut report),
            None => debug!(
                "City {} not found among {} current-condition entries",
                self.config.location_id,
                current.len()
            ),
        }

        report
    }

    /// Apply the daily forecast. Tomorrow's fields need at least two days.
    pub fn apply_forecast(&self, devices: &mut Devices, forecast: &ForecastReport) -> SyncReport {
        let mut report = SyncReport::default();
        self.apply_fields(devices, FORECAST_FIELDS, forecast, &mut report);
        report
    }

    fn apply_fields<S>(
        &self,
        devices: &mut Devices,
        fields: &[FieldDescriptor<S>],
        source: &S,
        report: &mut SyncReport,
    ) {
        for field in fields {
            let Some(value) = (field.extract)(source, &self.config) else {
                debug!("{} not available this cycle", field.name);
                report.skipped += 1;
                continue;
            };

            let device = devices.get_mut(field.device);
            let device_id = device.id();

            let (property, created) = self.registry.ensure(
                device,
                field.name,
                || (field.schema)(&self.config),
                value.clone(),
            );

            if created {
                report.created += 1;
            }

            if property.update(device_id, value, self.registry.host()) {
                report.updated += 1;
            } else if !created {
                report.unchanged += 1;
            }
        }
    }
}
