use forecast_core::{FetchState, WeatherReport};

/// Text for the current fetch state; empty while idle.
pub fn render(state: &FetchState) -> String {
    match state {
        FetchState::Idle => String::new(),
        FetchState::Loading => "Loading...".to_string(),
        FetchState::Failure(msg) => msg.clone(),
        FetchState::Success(report) => render_report(report),
    }
}

fn render_report(report: &WeatherReport) -> String {
    let temperature = report.temperature.as_ref().map(|t| t.to_string()).unwrap_or_default();

    format!(
        "Weather Information\n\
         Temperature: {temperature}°{unit}\n\
         Wind: {speed} {direction}\n\
         Conditions: {short}\n\
         Detailed Forecast: {detailed}",
        unit = text(&report.temperature_unit),
        speed = text(&report.wind_speed),
        direction = text(&report.wind_direction),
        short = text(&report.short_forecast),
        detailed = text(&report.detailed_forecast),
    )
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Print a state where it belongs: failures on stderr, everything else on stdout.
pub fn print_state(state: &FetchState) {
    let out = render(state);
    match state {
        FetchState::Idle => {}
        FetchState::Failure(_) => eprintln!("{out}"),
        _ => println!("{out}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sunny() -> WeatherReport {
        WeatherReport {
            temperature: Some(72.into()),
            temperature_unit: Some("F".into()),
            wind_speed: Some("5 mph".into()),
            wind_direction: Some("NW".into()),
            short_forecast: Some("Sunny".into()),
            detailed_forecast: Some("Clear skies".into()),
        }
    }

    #[test]
    fn renders_full_report() {
        let out = render(&FetchState::Success(sunny()));

        assert_eq!(
            out,
            "Weather Information\n\
             Temperature: 72°F\n\
             Wind: 5 mph NW\n\
             Conditions: Sunny\n\
             Detailed Forecast: Clear skies"
        );
    }

    #[test]
    fn fractional_temperature_is_kept() {
        let report = WeatherReport { temperature: serde_json::Number::from_f64(-3.5), ..sunny() };
        assert!(render(&FetchState::Success(report)).contains("Temperature: -3.5°F"));
    }

    #[test]
    fn absent_fields_render_empty() {
        let report = WeatherReport {
            temperature: None,
            temperature_unit: None,
            wind_speed: None,
            wind_direction: None,
            short_forecast: Some("Fog".into()),
            detailed_forecast: None,
        };

        let out = render(&FetchState::Success(report));
        assert!(out.contains("Temperature: °\n"));
        assert!(out.contains("Conditions: Fog\n"));
        assert!(out.ends_with("Detailed Forecast: "));
    }

    #[test]
    fn loading_failure_and_idle() {
        assert_eq!(render(&FetchState::Loading), "Loading...");
        assert_eq!(render(&FetchState::Failure("nope".into())), "nope");
        assert!(render(&FetchState::Idle).is_empty());
    }
}
