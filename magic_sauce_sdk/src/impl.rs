use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::auth::{AuthSession, TokenManager};
use crate::config::ClientConfig;
use crate::dto::{MagicSauceError, PredictionResult, Result, Token};
use crate::options::PredictionOptions;
use crate::transport::{RawResponse, Transport};

const TEXT_ENDPOINT: &str = "/text";
const LIKE_IDS_ENDPOINT: &str = "/like_ids";

/// Client for the Apply Magic Sauce prediction API.
pub struct MagicSauceClient {
    transport: Transport,
    tokens: TokenManager,
}

impl MagicSauceClient {
    /// Construct a client from a [`ClientConfig`].
    ///
    /// The configured timeout is applied per request by the transport. If the
    /// HTTP client cannot be built, [`MagicSauceError::Network`] is returned.
    ///
    /// ```no_run
    /// use magic_sauce_sdk::{ClientConfig, MagicSauceClient};
    ///
    /// let client = MagicSauceClient::new(ClientConfig::default().with_api_key("secret"))?;
    /// # Ok::<(), magic_sauce_sdk::MagicSauceError>(())
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| MagicSauceError::Network(err.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Build a client around a pre-configured `reqwest::Client`.
    ///
    /// Use this when you need custom TLS, proxies or instrumentation, or to
    /// point `config.base_url` at a mock server in tests.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let transport = Transport::new(client, config.base_url, config.timeout);
        let tokens = TokenManager::new(transport.clone(), config.api_key);
        Self { transport, tokens }
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Request a token for `customer_id`. See [`TokenManager::authenticate`].
    pub async fn authenticate(&self, customer_id: u64, api_key: Option<&str>) -> Result<Token> {
        self.tokens.authenticate(customer_id, api_key).await
    }

    /// Authenticate and wrap the token in an [`AuthSession`] ready to be
    /// passed to the prediction calls.
    pub async fn session(&self, customer_id: u64, api_key: Option<&str>) -> Result<AuthSession> {
        let token = self.authenticate(customer_id, api_key).await?;
        Ok(AuthSession::new(token))
    }

    /// Predict traits from free text.
    ///
    /// `text` is sent as the raw request body. Build `options` with
    /// [`PredictionOptions::text`]; the API rejects calls without a source.
    ///
    /// When the token has expired and a default API key is configured, the
    /// session token is renewed and the call is repeated once. A second
    /// rejection returns [`MagicSauceError::TokenExpired`].
    pub async fn predict_text(
        &self,
        text: &str,
        options: &PredictionOptions,
        session: &AuthSession,
    ) -> Result<PredictionResult> {
        let endpoint = endpoint_with_query(TEXT_ENDPOINT, options);
        self.predict(&endpoint, text.as_bytes().to_vec(), session)
            .await
    }

    /// Predict traits from a list of Facebook like ids.
    ///
    /// The ids are sent as a JSON array. Unknown ids are ignored by the API and
    /// show up as a lower [`PredictionResult::input_used`]. Retry behaviour is
    /// the same as [`MagicSauceClient::predict_text`].
    pub async fn predict_like_ids<S: AsRef<str>>(
        &self,
        ids: &[S],
        options: &PredictionOptions,
        session: &AuthSession,
    ) -> Result<PredictionResult> {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        let payload = serde_json::to_vec(&ids)?;
        let endpoint = endpoint_with_query(LIKE_IDS_ENDPOINT, options);
        self.predict(&endpoint, payload, session).await
    }

    async fn predict(
        &self,
        endpoint: &str,
        payload: Vec<u8>,
        session: &AuthSession,
    ) -> Result<PredictionResult> {
        let mut renewed = false;

        loop {
            let token = session.current().await;
            let response = self
                .transport
                .post(endpoint, payload.clone(), Some(token.token.as_str()))
                .await?;

            if response.status != StatusCode::FORBIDDEN {
                return decode_prediction(response);
            }

            if !self.tokens.can_renew() {
                return Err(MagicSauceError::TokenExpired);
            }
            if renewed {
                warn!(
                    customer_id = session.customer_id(),
                    endpoint, "token rejected again after renewal"
                );
                return Err(MagicSauceError::TokenExpired);
            }

            debug!(customer_id = session.customer_id(), endpoint, "token expired, renewing");
            let fresh = self.tokens.renew(&token).await?;
            session.replace(fresh).await;
            renewed = true;
        }
    }
}

fn endpoint_with_query(path: &str, options: &PredictionOptions) -> String {
    if options.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, options.to_query_string())
    }
}

/// Map a non-403 prediction response to a result.
fn decode_prediction(response: RawResponse) -> Result<PredictionResult> {
    match response.status {
        StatusCode::NO_CONTENT => Ok(PredictionResult::default()),
        status if status.is_success() => serde_json::from_slice(&response.body)
            .map_err(|err| MagicSauceError::Serialization(err.to_string())),
        status => Err(MagicSauceError::from_status(status, response.text())),
    }
}
