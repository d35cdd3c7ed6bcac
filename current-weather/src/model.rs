//! Object graph for one current-weather response.
//!
//! Every leaf is an `Option`: `None` means the service did not report the
//! field, which is not the same as reporting zero.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::WeatherError;

const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub coordinates: Coordinates,
    pub condition: WeatherCondition,
    pub general: GeneralInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Temperatures in kelvin unless the request asked for another unit system.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Temperature {
    pub degree: Option<f64>,
    pub feels_like: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Percent.
    pub humidity: Option<u32>,
}

impl Temperature {
    /// Kelvin to Celsius, rounded to two decimals.
    pub fn to_celsius(&self) -> Result<f64, WeatherError> {
        let kelvin = self.degree.ok_or_else(|| WeatherError::missing("main.temp"))?;
        Ok(round2(kelvin - KELVIN_OFFSET))
    }

    /// Kelvin to Fahrenheit, rounded to two decimals.
    pub fn to_fahrenheit(&self) -> Result<f64, WeatherError> {
        let kelvin = self.degree.ok_or_else(|| WeatherError::missing("main.temp"))?;
        Ok(round2(kelvin_to_fahrenheit(kelvin)))
    }

    pub fn feels_like_celsius(&self) -> Result<f64, WeatherError> {
        let kelvin = self.feels_like.ok_or_else(|| WeatherError::missing("main.feels_like"))?;
        Ok(round2(kelvin - KELVIN_OFFSET))
    }

    pub fn feels_like_fahrenheit(&self) -> Result<f64, WeatherError> {
        let kelvin = self.feels_like.ok_or_else(|| WeatherError::missing("main.feels_like"))?;
        Ok(round2(kelvin_to_fahrenheit(kelvin)))
    }
}

/// Atmospheric pressure in hPa.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pressure {
    pub main: Option<f64>,
    pub sea_level: Option<f64>,
    pub ground_level: Option<f64>,
}

impl Pressure {
    pub fn to_bar(&self) -> Result<f64, WeatherError> {
        let hpa = self.main.ok_or_else(|| WeatherError::missing("main.pressure"))?;
        Ok(hpa / 1000.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Wind {
    pub speed: Option<f64>,
    /// Meteorological degrees.
    pub degree: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clouds {
    pub percentage: Option<u8>,
}

impl Clouds {
    pub fn has_clouds(&self) -> bool {
        self.percentage.is_some_and(|p| p > 0)
    }

    /// Cloud cover above 50% counts as cloudy.
    pub fn is_cloudy(&self) -> bool {
        self.percentage.is_some_and(|p| p > 50)
    }
}

/// Rain volume in mm over the last one and three hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rain {
    pub volume_one_hour: Option<f64>,
    pub volume_three_hours: Option<f64>,
}

impl Rain {
    pub fn is_raining(&self) -> bool {
        any_positive(self.volume_one_hour, self.volume_three_hours)
    }
}

/// Snow volume in mm over the last one and three hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snow {
    pub volume_one_hour: Option<f64>,
    pub volume_three_hours: Option<f64>,
}

impl Snow {
    pub fn is_snowing(&self) -> bool {
        any_positive(self.volume_one_hour, self.volume_three_hours)
    }
}

/// Condition classification plus the physical measurements reported with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherCondition {
    pub id: Option<u32>,
    /// Condition group, e.g. "Rain" or "Clouds".
    pub group: Option<String>,
    pub description: Option<String>,
    /// Metres.
    pub visibility: Option<u32>,
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub wind: Wind,
    pub clouds: Clouds,
    pub rain: Rain,
    pub snow: Snow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct City {
    pub id: Option<u64>,
    pub name: Option<String>,
    /// ISO 3166 country code.
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralInfo {
    pub base: Option<String>,
    /// Observation time, unix seconds UTC.
    pub timestamp: Option<i64>,
    /// Shift in seconds from UTC to the location's local time.
    pub timezone_shift: Option<i32>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub city: City,
}

impl GeneralInfo {
    pub fn observed_at(&self) -> Result<DateTime<Utc>, WeatherError> {
        unix_to_utc(self.timestamp, "dt")
    }

    pub fn sunrise_at(&self) -> Result<DateTime<Utc>, WeatherError> {
        unix_to_utc(self.sunrise, "sys.sunrise")
    }

    pub fn sunset_at(&self) -> Result<DateTime<Utc>, WeatherError> {
        unix_to_utc(self.sunset, "sys.sunset")
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, WeatherError> {
        let shift = self.timezone_shift.ok_or_else(|| WeatherError::missing("timezone"))?;
        FixedOffset::east_opt(shift).ok_or_else(|| {
            WeatherError::Conversion(format!("timezone shift {shift}s is out of range"))
        })
    }

    /// Observation time in the location's local time.
    pub fn local_observed_at(&self) -> Result<DateTime<FixedOffset>, WeatherError> {
        Ok(self.observed_at()?.with_timezone(&self.utc_offset()?))
    }
}

fn unix_to_utc(ts: Option<i64>, field: &str) -> Result<DateTime<Utc>, WeatherError> {
    let ts = ts.ok_or_else(|| WeatherError::missing(field))?;
    DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        WeatherError::Conversion(format!("`{field}` value {ts} is not a valid unix timestamp"))
    })
}

fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    9.0 / 5.0 * (kelvin - KELVIN_OFFSET) + 32.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Absent volumes never exceed zero.
fn any_positive(one_hour: Option<f64>, three_hours: Option<f64>) -> bool {
    one_hour.is_some_and(|v| v > 0.0) || three_hours.is_some_and(|v| v > 0.0)
}
