use forecast_core::Coordinates;
use inquire::error::InquireResult;
use inquire::{Text, required};

/// Take coordinates from flags where given, prompting for the rest.
///
/// Only presence is checked. `previous` pre-fills the prompts so the
/// user can edit the last pair instead of retyping it.
pub fn collect(
    lat: Option<String>,
    lon: Option<String>,
    previous: &Coordinates,
) -> InquireResult<Coordinates> {
    let latitude = match present(lat) {
        Some(v) => v,
        None => prompt("Latitude:", "Enter latitude", &previous.latitude)?,
    };
    let longitude = match present(lon) {
        Some(v) => v,
        None => prompt("Longitude:", "Enter longitude", &previous.longitude)?,
    };

    Ok(Coordinates { latitude, longitude })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn prompt(label: &str, placeholder: &str, previous: &str) -> InquireResult<String> {
    let mut text = Text::new(label)
        .with_placeholder(placeholder)
        .with_validator(required!("This field is required"));

    if !previous.is_empty() {
        text = text.with_initial_value(previous);
    }

    text.prompt()
}
