//! Field catalog
//!
//! Every exposed property is described once here: which device it lives on,
//! its name, how to build its schema, and how to extract its value from the
//! upstream document. An extractor returning `None` means "skip this field
//! for this cycle".

use crate::compass::long_compass;
use crate::config::WeatherConfig;
use crate::device::{DeviceSlot, PropertySchema, PropertyValue, TEMPERATURE_PROPERTY};
use crate::snapshot::{CityConditions, ForecastReport};
use crate::units::to_display_unit;

/// Placeholder shown when the forecast text is empty
pub const EMPTY_FORECAST_TEXT: &str = "...";

/// Descriptor of one exposed property fed from a source document `S`
pub struct FieldDescriptor<S> {
    pub device: DeviceSlot,
    pub name: &'static str,
    pub schema: fn(&WeatherConfig) -> PropertySchema,
    pub extract: fn(&S, &WeatherConfig) -> Option<PropertyValue>,
}

/// Fields fed from the matched city's current conditions (today device)
pub static CURRENT_FIELDS: &[FieldDescriptor<CityConditions>] = &[
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_description",
        schema: description_schema,
        extract: current_description,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_humidity",
        schema: humidity_schema,
        extract: current_humidity,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_wind_direction",
        schema: wind_direction_schema,
        extract: current_wind_direction,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_wind_speed",
        schema: wind_speed_schema,
        extract: current_wind_speed,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_sunrise_hour",
        schema: sunrise_hour_schema,
        extract: sunrise_hour,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_sunrise_minute",
        schema: sunrise_minute_schema,
        extract: sunrise_minute,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_sunset_hour",
        schema: sunset_hour_schema,
        extract: sunset_hour,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "current_sunset_minute",
        schema: sunset_minute_schema,
        extract: sunset_minute,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "temperature",
        schema: temperature_schema,
        extract: current_temperature,
    },
];

/// Fields fed from the daily forecast (both devices)
pub static FORECAST_FIELDS: &[FieldDescriptor<ForecastReport>] = &[
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "minimum_temperature",
        schema: minimum_temperature_schema,
        extract: today_minimum_temperature,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "maximum_temperature",
        schema: maximum_temperature_schema,
        extract: today_maximum_temperature,
    },
    FieldDescriptor {
        device: DeviceSlot::Today,
        name: "description",
        schema: weather_today_schema,
        extract: today_description,
    },
    FieldDescriptor {
        device: DeviceSlot::Tomorrow,
        name: "weather",
        schema: weather_tomorrow_schema,
        extract: tomorrow_weather,
    },
    FieldDescriptor {
        device: DeviceSlot::Tomorrow,
        name: "minimum_temperature",
        schema: minimum_temperature_schema,
        extract: tomorrow_minimum_temperature,
    },
    FieldDescriptor {
        device: DeviceSlot::Tomorrow,
        name: "maximum_temperature",
        schema: tomorrow_maximum_temperature_schema,
        extract: tomorrow_maximum_temperature,
    },
];

// Schemas

fn description_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::string("Description")
}

fn humidity_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::integer("Humidity").with_unit("percent")
}

fn wind_direction_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::string("Wind direction")
}

fn wind_speed_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::number("Wind speed")
}

fn sunrise_hour_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::integer("Sunrise hour")
}

fn sunrise_minute_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::integer("Sunrise minute")
}

fn sunset_hour_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::integer("Sunset hour")
}

fn sunset_minute_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::integer("Sunset minute")
}

fn temperature_schema(config: &WeatherConfig) -> PropertySchema {
    PropertySchema::number("Temperature")
        .with_unit(config.units.temperature_unit())
        .with_semantic_type(TEMPERATURE_PROPERTY)
}

fn minimum_temperature_schema(config: &WeatherConfig) -> PropertySchema {
    PropertySchema::number("Minimum temperature").with_unit(config.units.temperature_unit())
}

fn maximum_temperature_schema(config: &WeatherConfig) -> PropertySchema {
    PropertySchema::number("Maximum temperature").with_unit(config.units.temperature_unit())
}

// Tomorrow's maximum doubles as that device's primary temperature reading.
fn tomorrow_maximum_temperature_schema(config: &WeatherConfig) -> PropertySchema {
    maximum_temperature_schema(config).with_semantic_type(TEMPERATURE_PROPERTY)
}

fn weather_today_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::string("Weather today")
}

fn weather_tomorrow_schema(_: &WeatherConfig) -> PropertySchema {
    PropertySchema::string("Weather tomorrow")
}

// Current-conditions extractors

fn current_description(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    city.description().map(PropertyValue::String)
}

fn current_humidity(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    let rh = city.humidity()?.round_ties_even();
    (rh >= i64::MIN as f64 && rh <= i64::MAX as f64).then(|| PropertyValue::Integer(rh as i64))
}

fn current_wind_direction(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    long_compass(&city.wind_direction()?).map(PropertyValue::String)
}

fn current_wind_speed(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    city.wind_speed().map(PropertyValue::Number)
}

fn sunrise_hour(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    clock_part(&city.sunrise()?, 0)
}

fn sunrise_minute(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    clock_part(&city.sunrise()?, 1)
}

fn sunset_hour(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    clock_part(&city.sunset()?, 0)
}

fn sunset_minute(city: &CityConditions, _: &WeatherConfig) -> Option<PropertyValue> {
    clock_part(&city.sunset()?, 1)
}

fn current_temperature(city: &CityConditions, config: &WeatherConfig) -> Option<PropertyValue> {
    let celsius = city.temperature()?;
    Some(PropertyValue::Number(to_display_unit(celsius, config.is_metric())))
}

/// Component `index` of an `HH:MM` string. Strings without `:` yield nothing.
fn clock_part(clock: &str, index: usize) -> Option<PropertyValue> {
    if !clock.contains(':') {
        return None;
    }
    let part = clock.split(':').nth(index)?.trim();
    part.parse::<i64>().ok().map(PropertyValue::Integer)
}

// Forecast extractors

fn today_minimum_temperature(report: &ForecastReport, config: &WeatherConfig) -> Option<PropertyValue> {
    report.day(0)?.min_temp(config.units).map(PropertyValue::Number)
}

fn today_maximum_temperature(report: &ForecastReport, config: &WeatherConfig) -> Option<PropertyValue> {
    report.day(0)?.max_temp(config.units).map(PropertyValue::Number)
}

// Reads tomorrow's text whenever today's is non-empty. Kept as the add-on
// has always shipped it.
fn today_description(report: &ForecastReport, _: &WeatherConfig) -> Option<PropertyValue> {
    let today = report.day(0)?.weather()?;
    if today.is_empty() {
        return Some(PropertyValue::from(EMPTY_FORECAST_TEXT));
    }
    report.day(1)?.weather().map(PropertyValue::String)
}

fn tomorrow_weather(report: &ForecastReport, _: &WeatherConfig) -> Option<PropertyValue> {
    let text = report.day(1)?.weather()?;
    if text.is_empty() {
        Some(PropertyValue::from(EMPTY_FORECAST_TEXT))
    } else {
        Some(PropertyValue::String(text))
    }
}

fn tomorrow_minimum_temperature(report: &ForecastReport, config: &WeatherConfig) -> Option<PropertyValue> {
    report.day(1)?.min_temp(config.units).map(PropertyValue::Number)
}

fn tomorrow_maximum_temperature(report: &ForecastReport, config: &WeatherConfig) -> Option<PropertyValue> {
    report.day(1)?.max_temp(config.units).map(PropertyValue::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn clock_parts() {
        assert_eq!(clock_part("06:45", 0), Some(PropertyValue::Integer(6)));
        assert_eq!(clock_part("06:45", 1), Some(PropertyValue::Integer(45)));
        assert_eq!(clock_part("0645", 0), None);
        assert_eq!(clock_part("06:", 1), None);
        assert_eq!(clock_part("xx:30", 0), None);
        assert_eq!(clock_part("xx:30", 1), Some(PropertyValue::Integer(30)));
    }

    #[test]
    fn humidity_rounds_half_to_even() {
        let config = WeatherConfig::default();
        let humidity = |rh: &str| {
            let city: CityConditions =
                serde_json::from_value(serde_json::json!({ "cityId": 144, "rh": rh })).unwrap();
            current_humidity(&city, &config)
        };

        assert_eq!(humidity("80.5"), Some(PropertyValue::Integer(80)));
        assert_eq!(humidity("81.5"), Some(PropertyValue::Integer(82)));
        assert_eq!(humidity("80.6"), Some(PropertyValue::Integer(81)));
    }

    #[test]
    fn names_are_unique_per_device() {
        let mut seen = HashSet::new();
        let current = CURRENT_FIELDS.iter().map(|f| (f.device, f.name));
        let forecast = FORECAST_FIELDS.iter().map(|f| (f.device, f.name));
        for key in current.chain(forecast) {
            assert!(seen.insert(key), "duplicate field {:?}", key);
        }
    }

    #[test]
    fn schema_types_match_extracted_values() {
        let config = WeatherConfig::default();
        let city: CityConditions = serde_json::from_value(serde_json::json!({
            "cityId": 144, "wxdesc": "Mist", "rh": "80.6", "wd": "SW", "ws": "3.5",
            "sunrise": "06:45", "sunset": "18:02", "temp": "10.5",
        }))
        .unwrap();

        for field in CURRENT_FIELDS {
            let value = (field.extract)(&city, &config).expect(field.name);
            assert_eq!((field.schema)(&config).value_type, value.value_type(), "{}", field.name);
        }
    }

    #[test]
    fn temperature_schemas_follow_unit_system() {
        let imperial = WeatherConfig::default().with_units(crate::config::UnitSystem::Imperial);
        assert_eq!(temperature_schema(&imperial).unit, Some("degree fahrenheit"));
        assert_eq!(
            temperature_schema(&WeatherConfig::default()).semantic_type,
            Some(TEMPERATURE_PROPERTY)
        );
        assert_eq!(minimum_temperature_schema(&imperial).semantic_type, None);
    }
}
