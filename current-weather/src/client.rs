use tracing::{debug, instrument};

use crate::{
    CurrentWeather, WeatherError,
    parse::parse_current,
    request::{Language, Location, QueryOptions, RequestBuilder, Unit, WeatherRequest},
    transport::{HttpTransport, Transport},
};

/// Fetches and parses current weather through an injected [`Transport`].
#[derive(Debug, Clone)]
pub struct CurrentWeatherClient<T = HttpTransport> {
    requests: RequestBuilder,
    transport: T,
}

impl CurrentWeatherClient<HttpTransport> {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let requests = RequestBuilder::new(api_key)?;
        Ok(Self {
            requests,
            transport: HttpTransport::new()?,
        })
    }
}

impl<T: Transport> CurrentWeatherClient<T> {
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> Result<Self, WeatherError> {
        Ok(Self {
            requests: RequestBuilder::new(api_key)?,
            transport,
        })
    }

    pub fn from_parts(requests: RequestBuilder, transport: T) -> Self {
        Self {
            requests,
            transport,
        }
    }

    /// The builder used for every lookup.
    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Send a prebuilt request and parse the answer.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, request: &WeatherRequest) -> Result<CurrentWeather, WeatherError> {
        let document = self.transport.get_json(&request.base_url, &request.params).await?;
        let weather = parse_current(&document)?;

        debug!(
            city = weather.general.city.name.as_deref().unwrap_or("-"),
            condition = weather.condition.description.as_deref().unwrap_or("-"),
            "parsed current weather"
        );

        Ok(weather)
    }

    pub async fn current(
        &self,
        location: &Location,
        options: &QueryOptions,
    ) -> Result<CurrentWeather, WeatherError> {
        debug!(%location, unit = ?options.unit, "requesting current weather");
        let request = self.requests.for_location(location, options)?;
        self.fetch(&request).await
    }

    pub async fn by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> Result<CurrentWeather, WeatherError> {
        let request = self.requests.by_coordinates(latitude, longitude, unit, language);
        self.fetch(&request).await
    }

    pub async fn by_city_name(
        &self,
        city_name: &str,
        state: Option<&str>,
        country: Option<&str>,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> Result<CurrentWeather, WeatherError> {
        let request = self.requests.by_city_name(city_name, state, country, unit, language)?;
        self.fetch(&request).await
    }

    pub async fn by_city_id(
        &self,
        city_id: u64,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> Result<CurrentWeather, WeatherError> {
        let request = self.requests.by_city_id(city_id, unit, language);
        self.fetch(&request).await
    }

    pub async fn by_postal_code(
        &self,
        postal_code: &str,
        unit: Option<Unit>,
        language: Option<&Language>,
    ) -> Result<CurrentWeather, WeatherError> {
        let request = self.requests.by_postal_code(postal_code, unit, language);
        self.fetch(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    type Seen = Arc<Mutex<Vec<(String, BTreeMap<String, String>)>>>;

    /// Replays one canned document and records every call.
    #[derive(Debug, Clone)]
    struct CannedTransport {
        reply: Value,
        seen: Seen,
    }

    impl CannedTransport {
        fn new(reply: Value) -> (Self, Seen) {
            let seen = Seen::default();
            let transport = Self {
                reply,
                seen: seen.clone(),
            };
            (transport, seen)
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn get_json(
            &self,
            base_url: &str,
            params: &BTreeMap<String, String>,
        ) -> Result<Value, WeatherError> {
            self.seen.lock().unwrap().push((base_url.to_string(), params.clone()));
            Ok(self.reply.clone())
        }
    }

    #[derive(Debug)]
    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn get_json(
            &self,
            _base_url: &str,
            _params: &BTreeMap<String, String>,
        ) -> Result<Value, WeatherError> {
            Err(WeatherError::transport("connection refused"))
        }
    }

    fn paris() -> Value {
        json!({
            "cod": 200,
            "coord": { "lat": 48.8534, "lon": 2.3488 },
            "weather": [{ "id": 800, "main": "Clear", "description": "ciel dégagé" }],
            "main": { "temp": 18.4 },
            "sys": { "country": "FR" },
            "id": 2988507,
            "name": "Paris"
        })
    }

    #[tokio::test]
    async fn city_name_lookup_goes_through_transport() {
        let (transport, seen) = CannedTransport::new(paris());
        let client = CurrentWeatherClient::with_transport("KEY", transport).unwrap();

        let weather = client
            .by_city_name("Paris", None, Some("FR"), Some(Unit::Metric), Some(&Language::FRENCH))
            .await
            .expect("canned document must parse");

        assert_eq!(weather.general.city.name.as_deref(), Some("Paris"));
        assert_eq!(weather.condition.description.as_deref(), Some("ciel dégagé"));

        let calls = seen.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (url, params) = &calls[0];
        assert_eq!(url, crate::request::CURRENT_WEATHER_URL);
        assert_eq!(params["q"], "Paris,FR");
        assert_eq!(params["appid"], "KEY");
        assert_eq!(params["units"], "metric");
        assert_eq!(params["lang"], "fr");
    }

    #[tokio::test]
    async fn every_lookup_mode_sends_its_key() {
        let (transport, seen) = CannedTransport::new(paris());
        let client = CurrentWeatherClient::with_transport("KEY", transport).unwrap();

        client.by_coordinates(48.85, 2.35, None, None).await.unwrap();
        client.by_city_id(2988507, None, None).await.unwrap();
        client.by_postal_code("75001,fr", None, None).await.unwrap();
        client
            .current(&Location::CityId(42), &QueryOptions::default())
            .await
            .unwrap();

        let calls = seen.lock().unwrap();
        let keys: Vec<Vec<&str>> = calls
            .iter()
            .map(|(_, p)| p.keys().map(String::as_str).collect())
            .collect();
        assert_eq!(
            keys,
            vec![
                vec!["appid", "lat", "lon"],
                vec!["appid", "id"],
                vec!["appid", "zip"],
                vec!["appid", "id"],
            ]
        );
    }

    #[tokio::test]
    async fn invalid_city_never_reaches_transport() {
        let (transport, seen) = CannedTransport::new(paris());
        let client = CurrentWeatherClient::with_transport("KEY", transport).unwrap();

        let err = client
            .by_city_name("", Some("X"), Some("Y"), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::InvalidArgument(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn service_error_is_propagated() {
        let (transport, _) =
            CannedTransport::new(json!({ "cod": "404", "message": "city not found" }));
        let client = CurrentWeatherClient::with_transport("KEY", transport).unwrap();

        let err = client
            .by_city_name("Abc", None, Some("123"), None, None)
            .await
            .unwrap_err();
        match err {
            WeatherError::Service { code, message } => {
                assert_eq!(code, "404");
                assert_eq!(message, "city not found");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_is_propagated_unchanged() {
        let client = CurrentWeatherClient::with_transport("KEY", FailingTransport).unwrap();

        let err = client.by_city_id(1, None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn empty_key_fails_at_construction() {
        let err = CurrentWeatherClient::with_transport("", FailingTransport).unwrap_err();
        assert!(matches!(err, WeatherError::Configuration(_)));
    }

    #[tokio::test]
    async fn custom_base_url_reaches_transport() {
        let (transport, seen) = CannedTransport::new(paris());
        let requests = RequestBuilder::new("KEY")
            .unwrap()
            .with_base_url("http://proxy.local/w");
        let client = CurrentWeatherClient::from_parts(requests, transport);
        assert_eq!(client.requests().base_url(), "http://proxy.local/w");

        client.by_city_id(1, None, None).await.unwrap();
        assert_eq!(seen.lock().unwrap()[0].0, "http://proxy.local/w");
    }

    #[tokio::test]
    async fn prebuilt_request_is_fetched_as_is() {
        let (transport, seen) = CannedTransport::new(paris());
        let client = CurrentWeatherClient::with_transport("KEY", transport).unwrap();
        let request = client.requests().by_postal_code("75001,fr", Some(Unit::Metric), None);

        let weather = client.fetch(&request).await.unwrap();

        assert_eq!(weather.coordinates.latitude, Some(48.8534));
        assert_eq!(seen.lock().unwrap()[0].1, request.params);
    }

    #[test]
    fn default_client_targets_public_endpoint() {
        let client = CurrentWeatherClient::new("KEY").unwrap();
        assert_eq!(client.requests().base_url(), crate::request::CURRENT_WEATHER_URL);
    }
}
