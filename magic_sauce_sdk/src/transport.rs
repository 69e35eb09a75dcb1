use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::dto::Result;

pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Status and fully read body of one API call.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as text, with invalid UTF-8 replaced. Used for error details.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues single POST requests against the API base URL.
///
/// Cloning is cheap; clones share the underlying `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Transport {
    pub fn new(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `endpoint` (path plus optional query string).
    ///
    /// The timeout covers the whole exchange including reading the body.
    /// Timeouts surface as [`crate::MagicSauceError::Timeout`], any other
    /// failure to reach the API as [`crate::MagicSauceError::Network`].
    pub async fn post(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        token: Option<&str>,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);
        if let Some(token) = token {
            request = request.header(AUTH_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "api call finished");
        Ok(RawResponse { status, body })
    }
}
