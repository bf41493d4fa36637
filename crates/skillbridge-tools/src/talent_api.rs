//! Minimal HTTP client for the Talent Management Skills API.
//!
//! Every tool in the catalog boils down to one GET through this client. The
//! response body is returned verbatim as text; non-2xx statuses are errors.

use std::time::Duration;

use reqwest::Client;

use skillbridge_types::{BridgeConfig, BridgeError};

/// Header carrying the API key, when one is configured.
const API_KEY_HEADER: &str = "X-API-Key";

pub struct TalentApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TalentApi {
    /// Build a client from the bridge configuration.
    pub fn new(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(config.tm_api_timeout_secs))
            .build()
            .map_err(|e| BridgeError::Api(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.tm_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.tm_api_key.clone(),
        })
    }

    /// GET `path` with the given query parameters and return the response
    /// body as text. 4xx/5xx statuses surface as errors.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> anyhow::Result<String> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
