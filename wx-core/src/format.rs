use std::fmt::Display;

use crate::{CurrentConditions, Units};

const RULE_WIDTH: usize = 50;
const MISSING_VALUE: &str = "N/A";
const MISSING_TEXT: &str = "Unknown";

/// Render a reading as the fixed multi-line report block.
///
/// Pure: no I/O, and identical input always yields identical output. Values
/// are displayed as the provider reported them in the requested `units`.
pub fn format_weather(reading: &CurrentConditions, units: Units) -> String {
    let sym = units.temperature_symbol();
    let main = reading.main.clone().unwrap_or_default();
    let condition = reading.primary_condition().cloned().unwrap_or_default();
    let wind_speed = reading.wind.as_ref().and_then(|w| w.speed.as_ref());

    let name = reading.name.as_deref().unwrap_or(MISSING_TEXT);
    let header = match reading.country() {
        Some(country) if !country.is_empty() => format!("Weather in {name}, {country}"),
        _ => format!("Weather in {name}"),
    };

    let rule = "=".repeat(RULE_WIDTH);
    let lines = [
        rule.clone(),
        header,
        rule.clone(),
        format!(
            "Condition: {} ({})",
            condition.main.as_deref().unwrap_or(MISSING_TEXT),
            condition.description.as_deref().unwrap_or(MISSING_TEXT),
        ),
        format!("Temperature: {}", with_unit(main.temp.as_ref(), sym)),
        format!("Feels like: {}", with_unit(main.feels_like.as_ref(), sym)),
        format!(
            "Min/Max: {} / {}",
            with_unit(main.temp_min.as_ref(), sym),
            with_unit(main.temp_max.as_ref(), sym),
        ),
        format!("Humidity: {}", with_unit(main.humidity.as_ref(), "%")),
        format!("Pressure: {}", with_unit(main.pressure.as_ref(), " hPa")),
        format!(
            "Wind Speed: {}",
            with_unit(wind_speed, &format!(" {}", units.wind_speed_label()))
        ),
        rule,
    ];

    lines.join("\n")
}

/// `value` followed by `unit`, or the bare placeholder when absent.
fn with_unit<T: Display>(value: Option<&T>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => MISSING_VALUE.to_string(),
    }
}
