//! Compass direction names for WMO wind direction codes

/// Expand a WMO wind direction code into a long compass name.
///
/// Unknown codes pass through unchanged. Returns `None` for an empty code.
pub fn long_compass(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    let name = match code.to_ascii_uppercase().as_str() {
        "N" => "North",
        "NNE" => "North-northeast",
        "NE" => "Northeast",
        "ENE" => "East-northeast",
        "E" => "East",
        "ESE" => "East-southeast",
        "SE" => "Southeast",
        "SSE" => "South-southeast",
        "S" => "South",
        "SSW" => "South-southwest",
        "SW" => "Southwest",
        "WSW" => "West-southwest",
        "W" => "West",
        "WNW" => "West-northwest",
        "NW" => "Northwest",
        "NNW" => "North-northwest",
        "CALM" | "C" => "Calm",
        "VRB" | "VAR" | "VARIABLE" => "Variable",
        _ => return Some(code.to_string()),
    };

    Some(name.to_string())
}
