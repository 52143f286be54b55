// # Gateway Host Trait
//
// The add-on does not subclass the gateway's device and property types.
// It owns its devices and reports to the gateway through this trait.
//
// ## Call order
//
// 1. `register_device` + `device_connected(true)` once per device at startup
// 2. `device_changed` whenever a device gains a property
// 3. `property_changed` whenever a property value actually changes

use crate::device::{Device, Property};

/// Capabilities the gateway exposes to the add-on
///
/// All calls are synchronous and made from the poller's task. Implementations
/// must not call back into the devices.
pub trait GatewayHost: Send + Sync {
    /// Announce a device to the gateway
    fn register_device(&self, device: &Device);

    /// Report the connection state of a device
    fn device_connected(&self, device_id: &str, connected: bool);

    /// The device's property set changed (a property was added)
    fn device_changed(&self, device: &Device);

    /// A property value changed
    fn property_changed(&self, device_id: &str, property: &Property);
}
