//! Facility search client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use super::error::FacilityError;

/// Default base URL for the facility search service.
const DEFAULT_BASE_URL: &str = "https://shipments.internal/api/v1";

/// Wrapper for the search response.
#[derive(Debug, Deserialize)]
struct FacilitiesResponse {
    facilities: Vec<FacilityDto>,
}

/// One facility search hit.
///
/// Carries the postal code alongside id and name so a selection can update
/// the stop's facility reference atomically, timezone key included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address_zipcode: Option<String>,
}

/// Configuration for the facility search client.
#[derive(Debug, Clone)]
pub struct FacilityClientConfig {
    /// API key for x-apikey header authentication
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FacilityClientConfig {
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

/// Client for the facility search service.
#[derive(Debug, Clone)]
pub struct FacilityClient {
    http: reqwest::Client,
    base_url: String,
}

impl FacilityClient {
    /// Create a new facility search client.
    pub fn new(config: FacilityClientConfig) -> Result<Self, FacilityError> {
        let mut headers = HeaderMap::new();

        let api_key_header =
            HeaderValue::from_str(&config.api_key).map_err(|_| FacilityError::Api {
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

    /// Search facilities by name fragment.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<FacilityDto>, FacilityError> {
        let url = format!("{}/facilities/search", self.base_url);
        let limit = limit.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FacilityError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FacilityError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let response: FacilitiesResponse =
            serde_json::from_str(&body).map_err(|e| FacilityError::Json {
                message: e.to_string(),
            })?;

        Ok(response.facilities)
    }
}
