//! Maps a decoded response document onto [`CurrentWeather`].
//!
//! The payload is irregular: sections and fields come and go with location
//! and conditions. Every field is read independently through
//! [`Section::field`], so a missing, `null` or wrongly-typed value only
//! blanks that one field.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    WeatherError,
    model::{
        City, Clouds, Coordinates, CurrentWeather, GeneralInfo, Pressure, Rain, Snow,
        Temperature, WeatherCondition, Wind,
    },
};

const SUCCESS_CODE: i64 = 200;

/// Parse one current-weather document.
///
/// A present `cod` other than 200 yields [`WeatherError::Service`]; nothing
/// is built from such a document.
pub fn parse_current(document: &Value) -> Result<CurrentWeather, WeatherError> {
    let root = document.as_object().ok_or_else(|| {
        WeatherError::transport(format!("expected a JSON object, got {}", kind_of(document)))
    })?;

    if let Some(cod) = root.get("cod").filter(|cod| !is_success(cod)) {
        return Err(WeatherError::Service {
            code: render_code(cod),
            message: root.get("message").map(render_message).unwrap_or_default(),
        });
    }

    let doc = Section(Some(root));
    let condition = doc
        .get("weather")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .map(Section::of)
        .unwrap_or_default();

    Ok(CurrentWeather {
        coordinates: Coordinates::from_section(doc.child("coord")),
        condition: WeatherCondition::from_sections(condition, doc),
        general: GeneralInfo::from_section(doc),
    })
}

impl CurrentWeather {
    pub fn from_document(document: &Value) -> Result<Self, WeatherError> {
        parse_current(document)
    }
}

/// A possibly-absent JSON object.
#[derive(Debug, Clone, Copy, Default)]
struct Section<'a>(Option<&'a Map<String, Value>>);

impl<'a> Section<'a> {
    fn of(value: &'a Value) -> Self {
        Self(value.as_object())
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0?.get(key)
    }

    fn child(&self, key: &str) -> Section<'a> {
        Section(self.get(key).and_then(Value::as_object))
    }

    fn field<T: Deserialize<'a>>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|value| T::deserialize(value).ok())
    }
}

impl Coordinates {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            latitude: s.field("lat"),
            longitude: s.field("lon"),
        }
    }
}

impl Temperature {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            degree: s.field("temp"),
            feels_like: s.field("feels_like"),
            min: s.field("temp_min"),
            max: s.field("temp_max"),
            humidity: s.field("humidity"),
        }
    }
}

impl Pressure {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            main: s.field("pressure"),
            sea_level: s.field("sea_level"),
            ground_level: s.field("grnd_level"),
        }
    }
}

impl Wind {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            speed: s.field("speed"),
            degree: s.field("deg"),
            gust: s.field("gust"),
        }
    }
}

impl Clouds {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            percentage: s.field("all"),
        }
    }
}

impl Rain {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            volume_one_hour: s.field("1h"),
            volume_three_hours: s.field("3h"),
        }
    }
}

impl Snow {
    fn from_section(s: Section<'_>) -> Self {
        Self {
            volume_one_hour: s.field("1h"),
            volume_three_hours: s.field("3h"),
        }
    }
}

impl WeatherCondition {
    /// `entry` is `weather[0]`; measurements come from the document root.
    fn from_sections(entry: Section<'_>, doc: Section<'_>) -> Self {
        let main = doc.child("main");

        Self {
            id: entry.field("id"),
            group: entry.field("main"),
            description: entry.field("description"),
            visibility: doc.field("visibility"),
            temperature: Temperature::from_section(main),
            pressure: Pressure::from_section(main),
            wind: Wind::from_section(doc.child("wind")),
            clouds: Clouds::from_section(doc.child("clouds")),
            rain: Rain::from_section(doc.child("rain")),
            snow: Snow::from_section(doc.child("snow")),
        }
    }
}

impl City {
    fn from_section(doc: Section<'_>) -> Self {
        Self {
            id: doc.field("id"),
            name: doc.field("name"),
            country: doc.child("sys").field("country"),
        }
    }
}

impl GeneralInfo {
    fn from_section(doc: Section<'_>) -> Self {
        let sys = doc.child("sys");

        Self {
            base: doc.field("base"),
            timestamp: doc.field("dt"),
            timezone_shift: doc.field("timezone"),
            sunrise: sys.field("sunrise"),
            sunset: sys.field("sunset"),
            city: City::from_section(doc),
        }
    }
}

// The service sends `cod` as a number on success and as a string on errors.
fn is_success(cod: &Value) -> bool {
    match cod {
        Value::Number(n) => n.as_i64() == Some(SUCCESS_CODE),
        Value::String(s) => s.trim().parse::<i64>().ok() == Some(SUCCESS_CODE),
        _ => false,
    }
}

fn render_code(cod: &Value) -> String {
    match cod {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_message(message: &Value) -> String {
    match message {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn london() -> Value {
        json!({
            "coord": { "lon": -0.1257, "lat": 51.5085 },
            "weather": [
                { "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" },
                { "id": 701, "main": "Mist", "description": "mist", "icon": "50d" }
            ],
            "base": "stations",
            "main": {
                "temp": 285.32,
                "feels_like": 284.61,
                "temp_min": 284.2,
                "temp_max": 286.48,
                "pressure": 1012,
                "humidity": 82,
                "sea_level": 1012,
                "grnd_level": 1008
            },
            "visibility": 10000,
            "wind": { "speed": 4.63, "deg": 240, "gust": 9.26 },
            "rain": { "1h": 0.35 },
            "clouds": { "all": 75 },
            "dt": 1_700_000_000,
            "sys": {
                "type": 2,
                "id": 2075535,
                "country": "GB",
                "sunrise": 1_699_946_000,
                "sunset": 1_699_979_000
            },
            "timezone": 0,
            "id": 2643743,
            "name": "London",
            "cod": 200
        })
    }

    #[test]
    fn parses_a_full_document() {
        let weather = parse_current(&london()).expect("success document must parse");

        let coordinates = Coordinates {
            latitude: Some(51.5085),
            longitude: Some(-0.1257),
        };
        assert_eq!(weather.coordinates, coordinates);

        let c = &weather.condition;
        assert_eq!(c.id, Some(500));
        assert_eq!(c.group.as_deref(), Some("Rain"));
        assert_eq!(c.description.as_deref(), Some("light rain"));
        assert_eq!(c.visibility, Some(10000));
        assert_eq!(c.temperature.degree, Some(285.32));
        assert_eq!(c.temperature.humidity, Some(82));
        let pressure = Pressure {
            main: Some(1012.0),
            sea_level: Some(1012.0),
            ground_level: Some(1008.0),
        };
        assert_eq!(c.pressure, pressure);
        let wind = Wind {
            speed: Some(4.63),
            degree: Some(240.0),
            gust: Some(9.26),
        };
        assert_eq!(c.wind, wind);
        assert_eq!(c.clouds.percentage, Some(75));
        assert!(c.rain.is_raining());
        assert_eq!(c.rain.volume_three_hours, None);
        assert_eq!(c.snow, Snow::default());

        let g = &weather.general;
        assert_eq!(g.base.as_deref(), Some("stations"));
        assert_eq!(g.timestamp, Some(1_700_000_000));
        assert_eq!(g.timezone_shift, Some(0));
        assert_eq!(g.sunrise, Some(1_699_946_000));
        assert_eq!(g.sunset, Some(1_699_979_000));
        let city = City {
            id: Some(2643743),
            name: Some("London".into()),
            country: Some("GB".into()),
        };
        assert_eq!(g.city, city);
    }

    #[test]
    fn values_are_not_converted_during_parsing() {
        let weather = parse_current(&london()).unwrap();
        let t = &weather.condition.temperature;

        assert_eq!(t.degree, Some(285.32));
        assert_eq!(t.to_celsius().unwrap(), 12.17);
    }

    #[test]
    fn missing_weather_list_yields_empty_condition() {
        let weather = parse_current(&json!({ "cod": 200 })).expect("no error for sparse document");

        assert_eq!(weather, CurrentWeather::default());
        assert_eq!(weather.condition.id, None);
        assert_eq!(weather.condition.description, None);
    }

    #[test]
    fn empty_weather_list_yields_empty_condition() {
        let doc = json!({ "cod": 200, "weather": [], "visibility": 8000 });
        let weather = parse_current(&doc).unwrap();

        assert_eq!(weather.condition.group, None);
        assert_eq!(weather.condition.visibility, Some(8000));
    }

    #[test]
    fn service_error_carries_message() {
        let doc = json!({ "cod": "404", "message": "city not found" });
        let err = parse_current(&doc).unwrap_err();

        match err {
            WeatherError::Service { code, message } => {
                assert_eq!(code, "404");
                assert_eq!(message, "city not found");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_error_code_is_rendered() {
        let doc = json!({ "cod": 401, "message": "Invalid API key." });
        let err = parse_current(&doc).unwrap_err();
        assert!(matches!(err, WeatherError::Service { ref code, .. } if code == "401"));

        let err = parse_current(&json!({ "cod": "400" })).unwrap_err();
        assert!(matches!(err, WeatherError::Service { ref message, .. } if message.is_empty()));
    }

    #[test]
    fn string_success_code_and_missing_code_parse() {
        let weather = parse_current(&json!({ "cod": "200", "name": "Oslo" })).unwrap();
        assert_eq!(weather.general.city.name.as_deref(), Some("Oslo"));

        let weather = parse_current(&json!({ "name": "Oslo" })).unwrap();
        assert_eq!(weather.general.city.name.as_deref(), Some("Oslo"));
    }

    #[test]
    fn zero_is_kept_distinct_from_absent() {
        let weather = parse_current(&json!({
            "clouds": { "all": 0 },
            "rain": { "1h": 0 },
            "main": { "humidity": 0 }
        }))
        .unwrap();

        let c = &weather.condition;
        assert_eq!(c.clouds.percentage, Some(0));
        assert_eq!(c.rain.volume_one_hour, Some(0.0));
        assert_eq!(c.temperature.humidity, Some(0));
        assert_eq!(c.temperature.degree, None);
    }

    #[test]
    fn null_and_mistyped_fields_are_absent() {
        let weather = parse_current(&json!({
            "coord": { "lat": null, "lon": "east" },
            "weather": [{ "id": "500", "main": 7, "description": "drizzle" }],
            "clouds": { "all": 300 },
            "wind": "calm",
            "sys": []
        }))
        .unwrap();

        assert_eq!(weather.coordinates, Coordinates::default());
        assert_eq!(weather.condition.id, None);
        assert_eq!(weather.condition.group, None);
        assert_eq!(weather.condition.description.as_deref(), Some("drizzle"));
        assert_eq!(weather.condition.clouds.percentage, None);
        assert_eq!(weather.condition.wind, Wind::default());
        assert_eq!(weather.general.city.country, None);
    }

    #[test]
    fn snow_section_is_read() {
        let weather = parse_current(&json!({ "snow": { "3h": 1.5 } })).unwrap();

        assert!(weather.condition.snow.is_snowing());
        assert!(!weather.condition.rain.is_raining());
    }

    #[test]
    fn non_object_document_is_a_transport_error() {
        for doc in [json!([1, 2]), json!("oops"), Value::Null] {
            let err = parse_current(&doc).unwrap_err();
            assert!(matches!(err, WeatherError::Transport(_)), "{doc}");
        }
    }

    #[test]
    fn parsing_twice_yields_equal_graphs() {
        let doc = london();
        let first = CurrentWeather::from_document(&doc).unwrap();
        let second = CurrentWeather::from_document(&doc).unwrap();

        assert_eq!(first, second);
    }
}
