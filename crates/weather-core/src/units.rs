//! Temperature unit conversion
//!
//! Only the current temperature is converted here. Forecast minimum and
//! maximum temperatures arrive pre-converted from the feed (`minTempF`,
//! `maxTempF`) and are merely selected by unit system.

/// Convert a Celsius reading to the display unit.
///
/// Metric readings are returned unchanged; imperial readings are converted
/// to Fahrenheit and rounded to one decimal.
pub fn to_display_unit(celsius: f64, metric: bool) -> f64 {
    if metric {
        celsius
    } else {
        round1(celsius * 1.8 + 32.0)
    }
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_and_boiling_points() {
        assert_eq!(to_display_unit(0.0, false), 32.0);
        assert_eq!(to_display_unit(100.0, false), 212.0);
    }

    #[test]
    fn metric_is_unchanged() {
        assert_eq!(to_display_unit(20.0, true), 20.0);
        assert_eq!(to_display_unit(-3.7, true), -3.7);
    }

    #[test]
    fn imperial_rounds_to_one_decimal() {
        // 10.5 * 1.8 + 32 = 50.9
        assert_eq!(to_display_unit(10.5, false), 50.9);
        // 21.37 * 1.8 + 32 = 70.466
        assert_eq!(to_display_unit(21.37, false), 70.5);
    }
}
