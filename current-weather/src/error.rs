use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the request builder, the document parser and the client.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The client could not be constructed, e.g. the API key is empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed input caught before any request is built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The service answered with a non-success `cod`.
    #[error("service reported error {code}: {message}")]
    Service { code: String, message: String },

    /// Network failure or an undecodable response body.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// A derived-unit accessor was called on a field the service did not report.
    #[error("conversion error: {0}")]
    Conversion(String),
}

impl WeatherError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::Conversion(format!("`{field}` was not reported by the service"))
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}
