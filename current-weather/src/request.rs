use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeMap, fmt, str::FromStr};

use crate::WeatherError;

pub const CURRENT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Unit system the service applies to temperatures and speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Kelvin, metre/sec. The service default.
    Standard,
    /// Celsius, metre/sec.
    Metric,
    /// Fahrenheit, miles/hour.
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Standard => "standard",
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Unit] {
        &[Unit::Standard, Unit::Metric, Unit::Imperial]
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Unit::Standard => "K",
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Unit::Standard | Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "standard" => Ok(Unit::Standard),
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(WeatherError::InvalidArgument(format!(
                "unknown unit '{value}', expected one of: standard, metric, imperial"
            ))),
        }
    }
}

/// Locale code for the human-readable description text.
///
/// The service documents a fixed list of codes, exposed as associated
/// constants, but any non-blank code is passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(Cow<'static, str>);

impl Language {
    pub const AFRIKAANS: Language = Language::from_static("af");
    pub const ALBANIAN: Language = Language::from_static("al");
    pub const ARABIC: Language = Language::from_static("ar");
    pub const AZERBAIJANI: Language = Language::from_static("az");
    pub const BULGARIAN: Language = Language::from_static("bg");
    pub const CATALAN: Language = Language::from_static("ca");
    pub const CZECH: Language = Language::from_static("cz");
    pub const DANISH: Language = Language::from_static("da");
    pub const GERMAN: Language = Language::from_static("de");
    pub const GREEK: Language = Language::from_static("el");
    pub const ENGLISH: Language = Language::from_static("en");
    pub const BASQUE: Language = Language::from_static("eu");
    pub const PERSIAN: Language = Language::from_static("fa");
    pub const FINNISH: Language = Language::from_static("fi");
    pub const FRENCH: Language = Language::from_static("fr");
    pub const GALICIAN: Language = Language::from_static("gl");
    pub const HEBREW: Language = Language::from_static("he");
    pub const HINDI: Language = Language::from_static("hi");
    pub const CROATIAN: Language = Language::from_static("hr");
    pub const HUNGARIAN: Language = Language::from_static("hu");
    pub const INDONESIAN: Language = Language::from_static("id");
    pub const ITALIAN: Language = Language::from_static("it");
    pub const JAPANESE: Language = Language::from_static("ja");
    pub const KOREAN: Language = Language::from_static("kr");
    pub const LATVIAN: Language = Language::from_static("la");
    pub const LITHUANIAN: Language = Language::from_static("lt");
    pub const MACEDONIAN: Language = Language::from_static("mk");
    pub const NORWEGIAN: Language = Language::from_static("no");
    pub const DUTCH: Language = Language::from_static("nl");
    pub const POLISH: Language = Language::from_static("pl");
    pub const PORTUGUESE: Language = Language::from_static("pt");
    pub const PORTUGUESE_BRAZIL: Language = Language::from_static("pt_br");
    pub const ROMANIAN: Language = Language::from_static("ro");
    pub const RUSSIAN: Language = Language::from_static("ru");
    pub const SWEDISH: Language = Language::from_static("sv");
    pub const SLOVAK: Language = Language::from_static("sk");
    pub const SLOVENIAN: Language = Language::from_static("sl");
    pub const SPANISH: Language = Language::from_static("es");
    pub const SERBIAN: Language = Language::from_static("sr");
    pub const THAI: Language = Language::from_static("th");
    pub const TURKISH: Language = Language::from_static("tr");
    pub const UKRAINIAN: Language = Language::from_static("uk");
    pub const VIETNAMESE: Language = Language::from_static("vi");
    pub const CHINESE_SIMPLIFIED: Language = Language::from_static("zh_cn");
    pub const CHINESE_TRADITIONAL: Language = Language::from_static("zh_tw");
    pub const ZULU: Language = Language::from_static("zu");

    const DOCUMENTED: &'static [&'static str] = &[
        "af", "al", "ar", "az", "bg", "ca", "cz", "da", "de", "el", "en", "eu", "fa", "fi", "fr",
        "gl", "he", "hi", "hr", "hu", "id", "it", "ja", "kr", "la", "lt", "mk", "no", "nl", "pl",
        "pt", "pt_br", "ro", "ru", "sv", "se", "sk", "sl", "sp", "es", "sr", "th", "tr", "ua",
        "uk", "vi", "zh_cn", "zh_tw", "zu",
    ];

    const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    /// Wrap a code without checking it against the documented list.
    pub fn new(code: impl Into<String>) -> Result<Self, WeatherError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(WeatherError::InvalidArgument(
                "language code must not be empty".into(),
            ));
        }
        Ok(Self(Cow::Owned(code)))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Whether the service lists this code (aliases such as `se`/`sp`/`ua` included).
    pub fn is_documented(&self) -> bool {
        Self::DOCUMENTED.contains(&self.code())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Language {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value.trim().to_lowercase())
    }
}

impl TryFrom<String> for Language {
    type Error = WeatherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0.into_owned()
    }
}

/// The four ways the service can identify a location.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates {
        latitude: f64,
        longitude: f64,
    },
    CityName {
        name: String,
        state: Option<String>,
        country: Option<String>,
    },
    CityId(u64),
    PostalCode(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coordinates { latitude, longitude } => {
                write!(f, "({latitude}, {longitude})")
            }
            Location::CityName { name, state, country } => {
                f.write_str(&city_query(name, state.as_deref(), country.as_deref()))
            }
            Location::CityId(id) => write!(f, "city #{id}"),
            Location::PostalCode(code) => write!(f, "zip {code}"),
        }
    }
}

/// Optional request parameters shared by every lookup mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub unit: Option<Unit>,
    pub language: Option<Language>,
}

/// Transport-ready description of one GET request.
#[derive(Clone, PartialEq)]
pub struct WeatherRequest {
    pub base_url: String,
    pub params: BTreeMap<String, String>,
}

impl WeatherRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for WeatherRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: BTreeMap<&str, &str> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), if k == "appid" { "***" } else { v.as_str() }))
            .collect();

        f.debug_struct("WeatherRequest")
            .field("base_url", &self.base_url)
            .field("params", &params)
            .finish()
    }
}

/// Builds requests for the current-weather endpoint. Performs no I/O.
#[derive(Clone)]
pub struct RequestBuilder {
    api_key: String,
    base_url: String,
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RequestBuilder {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(WeatherError::Configuration("no API key provided".into()));
        }

        Ok(Self {
            api_key,
            base_url: CURRENT_WEATHER_URL.to_string(),
        })
    }

    /// Point requests at another endpoint, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> WeatherRequest {
        self.request(
            [("lat", latitude.to_string()), ("lon", longitude.to_string())],
            unit,
            language,
        )
    }

    pub fn by_city_name(
        &self,
        city_name: &str,
        state: Option<&str>,
        country: Option<&str>,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> Result<WeatherRequest, WeatherError> {
        if city_name.trim().is_empty() {
            return Err(WeatherError::InvalidArgument("city name must not be empty".into()));
        }

        let query = city_query(city_name, state, country);
        Ok(self.request([("q", query)], unit, language))
    }

    pub fn by_city_id(
        &self,
        city_id: u64,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> WeatherRequest {
        self.request([("id", city_id.to_string())], unit, language)
    }

    pub fn by_postal_code(
        &self,
        postal_code: &str,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> WeatherRequest {
        self.request([("zip", postal_code.to_string())], unit, language)
    }

    pub fn for_location(
        &self,
        location: &Location,
        options: &QueryOptions,
    ) -> Result<WeatherRequest, WeatherError> {
        let unit = options.unit;
        let language = options.language.as_ref();

        match location {
            Location::Coordinates { latitude, longitude } => {
                Ok(self.by_coordinates(*latitude, *longitude, unit, language))
            }
            Location::CityName { name, state, country } => {
                self.by_city_name(name, state.as_deref(), country.as_deref(), unit, language)
            }
            Location::CityId(id) => Ok(self.by_city_id(*id, unit, language)),
            Location::PostalCode(code) => Ok(self.by_postal_code(code, unit, language)),
        }
    }

    fn request<const N: usize>(
        &self,
        lookup: [(&str, String); N],
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> WeatherRequest {
        let mut params: BTreeMap<String, String> = lookup
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        params.insert("appid".into(), self.api_key.clone());
        if let Some(unit) = unit {
            params.insert("units".into(), unit.as_str().into());
        }
        if let Some(language) = language {
            params.insert("lang".into(), language.code().into());
        }

        WeatherRequest {
            base_url: self.base_url.clone(),
            params,
        }
    }
}

fn city_query(city_name: &str, state: Option<&str>, country: Option<&str>) -> String {
    [Some(city_name), state, country]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
