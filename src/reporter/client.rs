use crate::domain::LogEvent;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Path appended to the collector base URL.
pub const LOG_PATH: &str = "log";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Collector base URL; events go to `{collector_url}/log`.
    pub collector_url: String,
    /// `None` keeps the HTTP client's default (no overall timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            collector_url: "http://localhost:8080".to_string(),
            timeout: None,
            user_agent: format!("profile-guard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Thin HTTP client bound to one collector endpoint.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    client: Client,
    log_url: Url,
}

impl CollectorClient {
    pub fn new(config: &ReporterConfig) -> Result<Self, ReportError> {
        let log_url = log_url(&config.collector_url)?;

        let mut builder = ClientBuilder::new().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ReportError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self { client, log_url })
    }

    pub fn log_url(&self) -> &Url {
        &self.log_url
    }

    /// Sends one event and decodes the collector's reply.
    pub async fn send(&self, event: &LogEvent) -> Result<Value, ReportError> {
        let body = serde_json::to_vec(event)?;

        let response = self
            .client
            .post(self.log_url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ReportError::HttpError {
                status: status.as_u16(),
                message: failure_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ReportError::InvalidResponse(e.to_string()))
    }
}

/// Resolves `{base}/log`, tolerating a trailing slash on the base.
pub fn log_url(base: &str) -> Result<Url, ReportError> {
    let mut url: Url = base.parse().map_err(|e| {
        ReportError::InvalidConfiguration(format!("Invalid collector URL '{base}': {e}"))
    })?;

    if url.cannot_be_a_base() {
        return Err(ReportError::InvalidConfiguration(format!(
            "Collector URL '{base}' cannot be used as a base"
        )));
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{path}/{LOG_PATH}"));
    Ok(url)
}

/// Picks the collector's `message` field out of an error body, falling back
/// to the raw text.
fn failure_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => body.to_string(),
        },
        Err(_) if body.trim().is_empty() => "<empty body>".to_string(),
        Err(_) => body.to_string(),
    }
}
