use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::{collections::BTreeMap, fmt::Debug, time::Duration};

use crate::WeatherError;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Performs the HTTP GET for a built request and returns the decoded body.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get_json(
        &self,
        base_url: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, WeatherError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http))
    }

    /// Reuse a preconfigured client, e.g. one routed through a proxy.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(
        &self,
        base_url: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, WeatherError> {
        let res = self.http.get(base_url).query(params).send().await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(%status, bytes = body.len(), "received weather response");

        decode_body(status, &body)
    }
}

/// Decode a response body.
///
/// Error statuses usually come with a JSON body holding `cod` and `message`;
/// those are passed on so the parser reports them. A JSON error body without
/// `cod` gets the HTTP status inserted.
fn decode_body(status: StatusCode, body: &str) -> Result<Value, WeatherError> {
    let parsed = serde_json::from_str::<Value>(body);

    if status.is_success() {
        return parsed.map_err(WeatherError::transport);
    }

    match parsed {
        Ok(Value::Object(mut obj)) => {
            obj.entry("cod").or_insert_with(|| Value::from(status.as_u16()));
            Ok(Value::Object(obj))
        }
        _ => Err(WeatherError::transport(format!(
            "request failed with status {}: {}",
            status,
            truncate_body(body),
        ))),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
