//! Stop persistence service client.

use std::collections::HashMap;
use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::domain::ShipmentId;

use super::error::TransportError;
use super::types::{CommitOutcome, StopRecord};

/// Default base URL for the shipment service.
const DEFAULT_BASE_URL: &str = "https://shipments.internal/api/v1";

/// Wrapper for stop list responses.
#[derive(Debug, Deserialize)]
struct StopsResponse {
    stops: Vec<StopRecord>,
}

/// Commit request body.
#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    stops: &'a [StopRecord],
}

/// Body of a 422 validation rejection.
#[derive(Debug, Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    errors: HashMap<String, String>,
}

/// The persistence boundary of an editing session.
///
/// This abstraction lets the session be driven by the real service or by
/// canned data in tests.
pub trait StopsTransport: Send + Sync {
    /// Fetch the persisted stop list for a shipment.
    fn fetch_stops(
        &self,
        shipment: ShipmentId,
    ) -> impl Future<Output = Result<Vec<StopRecord>, TransportError>> + Send;

    /// Submit the full ordered stop list for persistence.
    ///
    /// A validation rejection is a successful call with an
    /// [`CommitOutcome::Invalid`] payload, not an `Err`.
    fn commit_stops(
        &self,
        shipment: ShipmentId,
        stops: &[StopRecord],
    ) -> impl Future<Output = Result<CommitOutcome, TransportError>> + Send;
}

/// Configuration for the shipment service client.
#[derive(Debug, Clone)]
pub struct StopsClientConfig {
    /// API key for x-apikey header authentication
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StopsClientConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Client for the shipment stop persistence service.
#[derive(Debug, Clone)]
pub struct StopsClient {
    http: reqwest::Client,
    base_url: String,
}

impl StopsClient {
    /// Create a new shipment service client.
    pub fn new(config: StopsClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();

        let api_key_header =
            HeaderValue::from_str(&config.api_key).map_err(|_| TransportError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
        headers.insert(HeaderName::from_static("x-apikey"), api_key_header);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

impl StopsTransport for StopsClient {
    async fn fetch_stops(&self, shipment: ShipmentId) -> Result<Vec<StopRecord>, TransportError> {
        let url = format!("{}/shipments/{}/stops", self.base_url, shipment);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let response: StopsResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Json {
                message: e.to_string(),
            })?;

        Ok(response.stops)
    }

    async fn commit_stops(
        &self,
        shipment: ShipmentId,
        stops: &[StopRecord],
    ) -> Result<CommitOutcome, TransportError> {
        let url = format!("{}/shipments/{}/stops", self.base_url, shipment);

        let response = self
            .http
            .patch(&url)
            .json(&CommitRequest { stops })
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized);
        }

        // Validation rejections carry the field-error map the editor binds.
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await?;
            let rejection: ValidationResponse =
                serde_json::from_str(&body).map_err(|e| TransportError::Json {
                    message: e.to_string(),
                })?;
            return Ok(CommitOutcome::Invalid(rejection.errors));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let response: StopsResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Json {
                message: e.to_string(),
            })?;

        Ok(CommitOutcome::Saved(response.stops))
    }
}
