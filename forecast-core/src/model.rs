use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Latitude/longitude exactly as the user typed them.
///
/// Values are never parsed locally; they are forwarded to the provider
/// as-is and malformed input is the remote service's problem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self { latitude: latitude.into(), longitude: longitude.into() }
    }
}

/// Forecast fields as returned by the weather endpoint.
///
/// Absent fields stay absent: nothing is defaulted, the renderer shows
/// them as empty. The temperature keeps its JSON number form, so `72`
/// is written back as `72` rather than `72.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_forecast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_forecast: Option<String>,
}
