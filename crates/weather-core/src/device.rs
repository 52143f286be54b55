//! Devices and properties exposed to the gateway
//!
//! Two devices exist for the whole process lifetime: today's weather and
//! tomorrow's prediction. Each owns an insertion-ordered set of uniquely
//! named properties that grows as fields are first observed and never
//! shrinks.

use serde::Serialize;

use crate::traits::GatewayHost;

/// Identity of the "today" device
pub const TODAY_DEVICE_ID: &str = "candle-weather-today";
/// Identity of the "tomorrow" device
pub const TOMORROW_DEVICE_ID: &str = "candle-weather-tomorrow";

/// Capability tag shared by both devices
pub const TEMPERATURE_SENSOR: &str = "TemperatureSensor";
/// Semantic tag for a device's primary temperature reading
pub const TEMPERATURE_PROPERTY: &str = "TemperatureProperty";

/// JSON value kind of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Number,
}

/// Current value of a property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Number(f64),
}

impl PropertyValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::String(_) => ValueType::String,
            PropertyValue::Integer(_) => ValueType::Integer,
            PropertyValue::Number(_) => ValueType::Number,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

/// Property description announced to the gateway.
///
/// Fixed at creation time; only the property's value changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<&'static str>,

    pub title: &'static str,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,

    #[serde(rename = "readOnly")]
    pub read_only: bool,

    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

impl PropertySchema {
    /// Read-only string property
    pub fn string(title: &'static str) -> Self {
        Self {
            semantic_type: None,
            title,
            value_type: ValueType::String,
            unit: None,
            read_only: true,
            multiple_of: None,
        }
    }

    /// Read-only whole-number property
    pub fn integer(title: &'static str) -> Self {
        Self {
            value_type: ValueType::Integer,
            multiple_of: Some(1.0),
            ..Self::string(title)
        }
    }

    /// Read-only number property with one-decimal precision
    pub fn number(title: &'static str) -> Self {
        Self {
            value_type: ValueType::Number,
            multiple_of: Some(0.1),
            ..Self::string(title)
        }
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_semantic_type(mut self, semantic_type: &'static str) -> Self {
        self.semantic_type = Some(semantic_type);
        self
    }
}

/// A named, typed reading owned by a device
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    schema: PropertySchema,
    value: PropertyValue,
}

impl Property {
    pub(crate) fn new(name: impl Into<String>, schema: PropertySchema, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            schema,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Equality-gated update.
    ///
    /// Stores `value` and notifies the host exactly once when it differs from
    /// the current value. Returns whether a notification was sent.
    pub fn update(&mut self, device_id: &str, value: PropertyValue, host: &dyn GatewayHost) -> bool {
        if value == self.value {
            tracing::trace!("{}.{} was already {}", device_id, self.name, value);
            return false;
        }

        tracing::debug!("{}.{} -> {}", device_id, self.name, value);
        self.value = value;
        host.property_changed(device_id, self);
        true
    }

    /// Schema plus current value, as the gateway describes a property
    pub fn description(&self) -> serde_json::Value {
        let mut description = serde_json::to_value(&self.schema)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));
        if let serde_json::Value::Object(map) = &mut description {
            map.insert("name".to_string(), self.name.clone().into());
            map.insert(
                "value".to_string(),
                serde_json::to_value(&self.value).unwrap_or(serde_json::Value::Null),
            );
        }
        description
    }
}

/// A virtual device exposed to the gateway
#[derive(Debug, Clone)]
pub struct Device {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    capabilities: Vec<&'static str>,
    properties: Vec<Property>,
}

impl Device {
    pub fn new(id: &'static str, title: &'static str, description: &'static str) -> Self {
        Self {
            id,
            title,
            description,
            capabilities: vec![TEMPERATURE_SENSOR],
            properties: Vec::new(),
        }
    }

    /// Today's current conditions and forecast
    pub fn today() -> Self {
        Self::new(TODAY_DEVICE_ID, "Weather today", "Candle weather data")
    }

    /// Tomorrow's prediction
    pub fn tomorrow() -> Self {
        Self::new(TOMORROW_DEVICE_ID, "Weather tomorrow", "Candle weather prediction")
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub(crate) fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    pub(crate) fn property_at_mut(&mut self, index: usize) -> &mut Property {
        &mut self.properties[index]
    }

    /// Properties in discovery order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name()).collect()
    }

    /// Append a property and return its index. The caller guarantees the
    /// name is not taken.
    pub(crate) fn push_property(&mut self, property: Property) -> usize {
        debug_assert!(self.find_property(&property.name).is_none());
        self.properties.push(property);
        self.properties.len() - 1
    }

    /// Thing description as announced to the gateway
    pub fn description(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|p| (p.name.clone(), p.description()))
            .collect();

        serde_json::json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "@type": self.capabilities,
            "properties": properties,
        })
    }
}

/// Selects one of the two devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceSlot {
    Today,
    Tomorrow,
}

/// The pair of devices owned by the add-on
#[derive(Debug, Clone)]
pub struct Devices {
    pub today: Device,
    pub tomorrow: Device,
}

impl Devices {
    pub fn new() -> Self {
        Self {
            today: Device::today(),
            tomorrow: Device::tomorrow(),
        }
    }

    pub fn get_mut(&mut self, slot: DeviceSlot) -> &mut Device {
        match slot {
            DeviceSlot::Today => &mut self.today,
            DeviceSlot::Tomorrow => &mut self.tomorrow,
        }
    }

    /// Announce both devices to the host and mark them connected
    pub fn register(&self, host: &dyn GatewayHost) {
        for device in [&self.today, &self.tomorrow] {
            host.register_device(device);
            host.device_connected(device.id(), true);
            tracing::info!("Registered device {} ({})", device.id(), device.title());
        }
    }
}

impl Default for Devices {
    fn default() -> Self {
        Self::new()
    }
}
