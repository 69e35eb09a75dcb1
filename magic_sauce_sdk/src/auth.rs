//! Token issuance and renewal.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::dto::{MagicSauceError, Result, Token};
use crate::transport::Transport;

const AUTH_ENDPOINT: &str = "/auth";

#[derive(Serialize)]
struct AuthPayload<'a> {
    customer_id: u64,
    api_key: &'a str,
}

/// Requests tokens from `/auth` and renews them with the configured key.
#[derive(Debug)]
pub struct TokenManager {
    transport: Transport,
    default_api_key: Option<SecretString>,
}

impl TokenManager {
    pub fn new(transport: Transport, default_api_key: Option<SecretString>) -> Self {
        Self {
            transport,
            default_api_key,
        }
    }

    /// Whether expired tokens can be renewed without the caller's help.
    pub fn can_renew(&self) -> bool {
        self.default_key().is_some()
    }

    fn default_key(&self) -> Option<&str> {
        self.default_api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.is_empty())
    }

    /// Exchange a customer id and API key for a [`Token`].
    ///
    /// An empty or missing `api_key` falls back to the configured default.
    /// If neither is set the request still goes out and the API rejects it.
    ///
    /// * 400 → [`MagicSauceError::BadRequest`] with the response body
    /// * 403 → [`MagicSauceError::AuthenticationFailure`]
    /// * 404 → [`MagicSauceError::EndpointNotFound`]
    /// * 500 → [`MagicSauceError::ServiceUnavailable`]
    pub async fn authenticate(&self, customer_id: u64, api_key: Option<&str>) -> Result<Token> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .or_else(|| self.default_key())
            .unwrap_or_default();

        let payload = serde_json::to_vec(&AuthPayload {
            customer_id,
            api_key,
        })?;

        debug!(customer_id, "requesting authentication token");
        let response = self.transport.post(AUTH_ENDPOINT, payload, None).await?;

        if !response.status.is_success() {
            return Err(auth_error(response.status, response.text()));
        }

        let token: Token = serde_json::from_slice(&response.body)?;
        Ok(token)
    }

    /// Request a fresh token for the customer that owns `token`.
    ///
    /// Needs a configured default API key; without one this returns
    /// [`MagicSauceError::TokenExpired`] and the caller has to authenticate
    /// again. Any failure of the underlying call is wrapped in
    /// [`MagicSauceError::RenewalFailed`]. `token` itself is never changed.
    pub async fn renew(&self, token: &Token) -> Result<Token> {
        let Some(api_key) = self.default_key() else {
            return Err(MagicSauceError::TokenExpired);
        };

        let renewed = self
            .authenticate(token.customer_id, Some(api_key))
            .await
            .map_err(|err| MagicSauceError::RenewalFailed(Box::new(err)))?;

        info!(customer_id = token.customer_id, "authentication token renewed");
        Ok(Token {
            customer_id: token.customer_id,
            ..renewed
        })
    }
}

/// Status table of `/auth`. Unlike the prediction routes it has no quota, so
/// a 429 here is just another unexpected answer.
fn auth_error(status: StatusCode, body: String) -> MagicSauceError {
    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND
        | StatusCode::INTERNAL_SERVER_ERROR => MagicSauceError::from_status(status, body),
        other => MagicSauceError::UnexpectedStatus {
            status: other.as_u16(),
            body,
        },
    }
}

/// Shared handle to the current token of one customer.
///
/// Clones point at the same slot. The prediction client swaps in renewed
/// tokens through [`AuthSession::replace`]; the customer id never changes.
#[derive(Clone, Debug)]
pub struct AuthSession {
    customer_id: u64,
    current: Arc<RwLock<Token>>,
}

impl AuthSession {
    pub fn new(token: Token) -> Self {
        Self {
            customer_id: token.customer_id,
            current: Arc::new(RwLock::new(token)),
        }
    }

    pub fn customer_id(&self) -> u64 {
        self.customer_id
    }

    /// Snapshot of the current token.
    pub async fn current(&self) -> Token {
        self.current.read().await.clone()
    }

    /// Install `token` as the current token and return the previous one.
    ///
    /// The stored customer id is kept even if `token` names another one.
    pub async fn replace(&self, token: Token) -> Token {
        let token = Token {
            customer_id: self.customer_id,
            ..token
        };
        let mut guard = self.current.write().await;
        std::mem::replace(&mut *guard, token)
    }
}
