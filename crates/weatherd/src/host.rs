// Gateway host that reports to the log
//
// Stands in for the gateway's device API when the add-on runs as a
// standalone daemon.

use tracing::{debug, info};
use weather_core::device::{Device, Property};
use weather_core::traits::GatewayHost;

/// GatewayHost implementation backed by tracing events
#[derive(Debug, Default)]
pub struct LogHost;

impl LogHost {
    pub fn new() -> Self {
        Self
    }
}

impl GatewayHost for LogHost {
    fn register_device(&self, device: &Device) {
        info!(device = device.id(), title = device.title(), "Device registered");
        debug!(device = device.id(), description = %device.description(), "Thing description");
    }

    fn device_connected(&self, device_id: &str, connected: bool) {
        info!(device = device_id, connected, "Device connection state");
    }

    fn device_changed(&self, device: &Device) {
        debug!(
            device = device.id(),
            properties = device.properties().len(),
            "Device properties changed"
        );
    }

    fn property_changed(&self, device_id: &str, property: &Property) {
        info!(
            device = device_id,
            property = property.name(),
            value = %property.value(),
            unit = property.schema().unit.unwrap_or(""),
            "Property changed"
        );
    }
}
