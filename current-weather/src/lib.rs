//! Client library for the OpenWeather current-weather endpoint.
//!
//! This crate defines:
//! - Request construction for the four lookup modes (coordinates, city name, city id, postal code)
//! - A tolerant mapping from the response document to a typed object graph
//! - A pluggable transport with a `reqwest` default
//! - Configuration & credentials handling
//!
//! It is used by `current-weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod request;
pub mod transport;

pub use client::CurrentWeatherClient;
pub use config::{Config, client_from_config};
pub use error::WeatherError;
pub use model::{
    City, Clouds, Coordinates, CurrentWeather, GeneralInfo, Pressure, Rain, Snow, Temperature,
    WeatherCondition, Wind,
};
pub use parse::parse_current;
pub use request::{Language, Location, QueryOptions, RequestBuilder, Unit, WeatherRequest};
pub use transport::{HttpTransport, Transport};
