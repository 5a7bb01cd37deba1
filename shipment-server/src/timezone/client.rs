//! Postal-code timezone lookup client.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::domain::PostalCode;

use super::TimezoneMap;
use super::error::TimezoneError;

/// Default base URL for the timezone lookup service.
const DEFAULT_BASE_URL: &str = "https://geo.internal/api/v1";

/// Wrapper for the batch lookup response.
#[derive(Debug, Deserialize)]
struct TimezonesResponse {
    timezones: HashMap<String, TimezoneDto>,
}

/// Per-postal-code payload; only the IANA identifier matters here.
#[derive(Debug, Deserialize)]
struct TimezoneDto {
    timezone: String,
}

/// Configuration for the timezone lookup client.
#[derive(Debug, Clone)]
pub struct TimezoneClientConfig {
    /// API key for x-apikey header authentication
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TimezoneClientConfig {
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

/// Client for the postal-code timezone lookup service.
#[derive(Debug, Clone)]
pub struct TimezoneClient {
    http: reqwest::Client,
    base_url: String,
}

impl TimezoneClient {
    /// Create a new timezone lookup client.
    pub fn new(config: TimezoneClientConfig) -> Result<Self, TimezoneError> {
        let mut headers = HeaderMap::new();

        let api_key_header =
            HeaderValue::from_str(&config.api_key).map_err(|_| TimezoneError::Api {
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

    /// Resolve a batch of postal codes in one request.
    ///
    /// Codes the service does not know, and identifiers that are not valid
    /// IANA zone names, are silently absent from the result; the caller falls
    /// back to local-instant handling for those.
    pub async fn resolve_batch(&self, codes: &[PostalCode]) -> Result<TimezoneMap, TimezoneError> {
        let url = format!("{}/timezones", self.base_url);
        let zipcodes = codes
            .iter()
            .map(PostalCode::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .get(&url)
            .query(&[("zipcodes", zipcodes.as_str())])
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TimezoneError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TimezoneError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let response: TimezonesResponse =
            serde_json::from_str(&body).map_err(|e| TimezoneError::Json {
                message: e.to_string(),
            })?;

        let mut map = TimezoneMap::new();
        for (code, dto) in response.timezones {
            let Ok(code) = PostalCode::parse(&code) else {
                continue;
            };
            let Ok(tz) = dto.timezone.parse::<chrono_tz::Tz>() else {
                continue;
            };
            map.insert(code, tz);
        }

        Ok(map)
    }
}
