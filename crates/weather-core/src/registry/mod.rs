//! Lookup-or-create registry for device properties
//!
//! Properties are created lazily, the first time their source field yields
//! a value. Creation is strictly additive: an existing property is never
//! replaced, re-typed or reset.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = PropertyRegistry::new(host);
//! let (property, created) = registry.ensure(
//!     &mut devices.today,
//!     "current_humidity",
//!     || PropertySchema::integer("Humidity").with_unit("percent"),
//!     PropertyValue::Integer(81),
//! );
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::device::{Device, Property, PropertySchema, PropertyValue};
use crate::traits::GatewayHost;

/// Registry that creates properties on first sight and announces them
/// to the host
#[derive(Clone)]
pub struct PropertyRegistry {
    host: Arc<dyn GatewayHost>,
}

impl PropertyRegistry {
    pub fn new(host: Arc<dyn GatewayHost>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &dyn GatewayHost {
        self.host.as_ref()
    }

    /// Return the property named `name`, creating it when absent.
    ///
    /// An existing property is returned untouched: `schema` is not called and
    /// `initial` is discarded. A new property is built from `schema()` with
    /// `initial` as its value, appended to the device, and the host is told
    /// the device's property set changed.
    ///
    /// # Returns
    ///
    /// The property and whether it was created by this call
    pub fn ensure<'d, F>(
        &self,
        device: &'d mut Device,
        name: &str,
        schema: F,
        initial: PropertyValue,
    ) -> (&'d mut Property, bool)
    where
        F: FnOnce() -> PropertySchema,
    {
        if let Some(index) = device.property_index(name) {
            return (device.property_at_mut(index), false);
        }

        let schema = schema();
        debug_assert_eq!(schema.value_type, initial.value_type());

        debug!(
            "{}.{} did not exist yet, creating it with {}",
            device.id(),
            name,
            initial
        );
        let index = device.push_property(Property::new(name, schema, initial));
        self.host.device_changed(device);

        (device.property_at_mut(index), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Devices;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingHost {
        device_changes: Mutex<Vec<String>>,
        property_changes: Mutex<Vec<String>>,
    }

    impl GatewayHost for CountingHost {
        fn register_device(&self, _device: &Device) {}

        fn device_connected(&self, _device_id: &str, _connected: bool) {}

        fn device_changed(&self, device: &Device) {
            self.device_changes.lock().unwrap().push(device.id().to_string());
        }

        fn property_changed(&self, _device_id: &str, property: &Property) {
            self.property_changes.lock().unwrap().push(property.name().to_string());
        }
    }

    #[test]
    fn ensure_creates_once_and_notifies_device_change() {
        let host = Arc::new(CountingHost::default());
        let registry = PropertyRegistry::new(host.clone());
        let mut devices = Devices::new();

        let (property, created) = registry.ensure(
            &mut devices.today,
            "current_humidity",
            || PropertySchema::integer("Humidity").with_unit("percent"),
            PropertyValue::Integer(81),
        );
        assert!(created);
        assert_eq!(property.value(), &PropertyValue::Integer(81));

        assert_eq!(devices.today.property_names(), vec!["current_humidity"]);
        assert_eq!(host.device_changes.lock().unwrap().len(), 1);
        assert!(host.property_changes.lock().unwrap().is_empty());
    }

    #[test]
    fn ensure_is_idempotent() {
        let host = Arc::new(CountingHost::default());
        let registry = PropertyRegistry::new(host.clone());
        let mut devices = Devices::new();

        registry.ensure(
            &mut devices.today,
            "temperature",
            || PropertySchema::number("Temperature").with_unit("degree celsius"),
            PropertyValue::Number(10.5),
        );

        let mut factory_called = false;
        let (property, created) = registry.ensure(
            &mut devices.today,
            "temperature",
            || {
                factory_called = true;
                PropertySchema::number("Other").with_unit("degree fahrenheit")
            },
            PropertyValue::Number(99.0),
        );

        assert!(!created);
        assert!(!factory_called);
        assert_eq!(property.value(), &PropertyValue::Number(10.5));
        assert_eq!(property.schema().unit, Some("degree celsius"));
        assert_eq!(devices.today.properties().len(), 1);
        assert_eq!(host.device_changes.lock().unwrap().len(), 1);
    }

    #[test]
    fn ensure_keeps_devices_separate() {
        let host = Arc::new(CountingHost::default());
        let registry = PropertyRegistry::new(host);
        let mut devices = Devices::new();

        for device in [&mut devices.today, &mut devices.tomorrow] {
            registry.ensure(
                device,
                "minimum_temperature",
                || PropertySchema::number("Minimum temperature"),
                PropertyValue::Number(1.0),
            );
        }

        assert!(devices.today.find_property("minimum_temperature").is_some());
        assert!(devices.tomorrow.find_property("minimum_temperature").is_some());
    }
}
