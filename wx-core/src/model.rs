//! Current-conditions payload as returned by OpenWeatherMap.
//!
//! The provider does not guarantee every field for every location, so every
//! field is optional. Numbers are kept as [`serde_json::Number`] so they print
//! exactly as the provider sent them (`68.0` stays `68.0`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::Location;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub name: Option<String>,
    pub sys: Option<Sys>,
    /// A `null` list or `null` entries read as no conditions.
    #[serde(deserialize_with = "conditions")]
    pub weather: Vec<Condition>,
    pub main: Option<MainReadings>,
    pub wind: Option<Wind>,
    /// Observation time, unix seconds.
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sys {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub main: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: Option<Number>,
    pub feels_like: Option<Number>,
    pub temp_min: Option<Number>,
    pub temp_max: Option<Number>,
    pub humidity: Option<Number>,
    pub pressure: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: Option<Number>,
}

fn conditions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Condition>, D::Error> {
    let raw = Option::<Vec<Option<Condition>>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

impl CurrentConditions {
    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref()?.country.as_deref()
    }

    /// The first reported condition, if any.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt?, 0)
    }

    /// Replace the provider's place label with a zip table row.
    ///
    /// Coordinate lookups come back labelled with whatever station the
    /// provider picked, which is often a neighbourhood name.
    pub fn relabel(&mut self, location: &Location) {
        self.name = Some(location.place_name.clone());
        self.sys = Some(Sys { country: Some(location.region_code.clone()) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_decodes() {
        let json = r#"{
            "coord": {"lon": -0.13, "lat": 51.51},
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "main": {"temp": 15.5, "feels_like": 14.2, "temp_min": 14.0, "temp_max": 17.0,
                     "pressure": 1013, "humidity": 65},
            "wind": {"speed": 3.5, "deg": 240},
            "dt": 1700000000,
            "sys": {"country": "GB", "sunrise": 1699945000},
            "name": "London",
            "cod": 200
        }"#;

        let cc: CurrentConditions = serde_json::from_str(json).unwrap();

        assert_eq!(cc.name.as_deref(), Some("London"));
        assert_eq!(cc.country(), Some("GB"));
        assert_eq!(cc.primary_condition().unwrap().main.as_deref(), Some("Clear"));
        let main = cc.main.unwrap();
        assert_eq!(main.temp.unwrap().to_string(), "15.5");
        assert_eq!(main.temp_min.unwrap().to_string(), "14.0");
        assert_eq!(main.humidity.unwrap().to_string(), "65");
    }

    #[test]
    fn empty_object_decodes_to_default() {
        let cc: CurrentConditions = serde_json::from_str("{}").unwrap();
        assert_eq!(cc, CurrentConditions::default());
        assert!(cc.country().is_none());
        assert!(cc.primary_condition().is_none());
        assert!(cc.observed_at().is_none());
    }

    #[test]
    fn null_fields_are_tolerated() {
        let json = r#"{"name": null, "main": {"temp": null}, "wind": null, "weather": []}"#;
        let cc: CurrentConditions = serde_json::from_str(json).unwrap();
        assert!(cc.name.is_none());
        assert!(cc.main.unwrap().temp.is_none());
        assert!(cc.wind.is_none());
    }

    #[test]
    fn null_weather_list_is_empty() {
        let json = r#"{"name": "X", "weather": null, "main": {"temp": 1.5}}"#;
        let cc: CurrentConditions = serde_json::from_str(json).unwrap();

        assert!(cc.weather.is_empty());
        assert!(cc.primary_condition().is_none());
        assert_eq!(cc.main.unwrap().temp.unwrap().to_string(), "1.5");
    }

    #[test]
    fn null_conditions_are_skipped() {
        let cc: CurrentConditions = serde_json::from_str(r#"{"weather": [null]}"#).unwrap();
        assert!(cc.primary_condition().is_none());

        let json = r#"{"weather": [null, {"main": "Rain", "description": "light rain"}]}"#;
        let cc: CurrentConditions = serde_json::from_str(json).unwrap();
        assert_eq!(cc.primary_condition().unwrap().main.as_deref(), Some("Rain"));
    }

    #[test]
    fn observed_at_converts_unix_seconds() {
        let cc = CurrentConditions { dt: Some(0), ..Default::default() };
        assert_eq!(cc.observed_at().unwrap().to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn relabel_uses_table_place() {
        let mut cc = CurrentConditions {
            name: Some("Ballantyne".into()),
            sys: Some(Sys { country: Some("US".into()) }),
            ..Default::default()
        };
        let loc = Location {
            zip: 28277,
            latitude: 35.0554,
            longitude: -80.8185,
            place_name: "Charlotte".into(),
            region_code: "NC".into(),
            region_name: "North Carolina".into(),
        };

        cc.relabel(&loc);

        assert_eq!(cc.name.as_deref(), Some("Charlotte"));
        assert_eq!(cc.country(), Some("NC"));
    }
}
