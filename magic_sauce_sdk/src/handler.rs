use serde::{Deserialize, Serialize};

use crate::{ClientConfig, MagicSauceClient, MagicSauceError, PredictionOptions, Source};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
/// Input to predict from.
///
/// Serialized with `type`/`value` keys, for example:
///
/// ```json
/// { "type": "like_ids", "value": { "ids": ["5845317146"] } }
/// ```
pub enum PredictionInput {
    Text { text: String, source: Source },
    LikeIds { ids: Vec<String> },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
/// Request payload for a single prediction.
///
/// * `api_key` is optional when the [`ClientConfig`] carries a default key.
/// * `contributors` only applies to like-id input and is ignored for text.
pub struct PredictionRequest {
    pub customer_id: u64,
    #[serde(default)]
    pub api_key: Option<String>,
    pub input: PredictionInput,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub interpretations: bool,
    #[serde(default)]
    pub contributors: bool,
}

impl PredictionRequest {
    pub fn options(&self) -> PredictionOptions {
        match &self.input {
            PredictionInput::Text { source, .. } => {
                PredictionOptions::text(*source, &self.traits, self.interpretations)
            }
            PredictionInput::LikeIds { .. } => {
                PredictionOptions::like_ids(&self.traits, self.interpretations, self.contributors)
            }
        }
    }
}

/// Execute a prediction described by a [`PredictionRequest`], returning
/// serialized JSON.
///
/// Each call builds its own client and session, so the token is not reused
/// between requests. The request's `api_key` takes precedence over the one in
/// `config`. Returns the [`crate::PredictionResult`] as JSON.
///
/// # Examples
///
/// ```no_run
/// use magic_sauce_sdk::{ClientConfig, PredictionInput, PredictionRequest, Source};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), magic_sauce_sdk::MagicSauceError> {
/// let request = PredictionRequest {
///     customer_id: 1234,
///     api_key: None,
///     input: PredictionInput::Text {
///         text: "Lorem ipsum dolor sit amet".to_string(),
///         source: Source::Other,
///     },
///     traits: vec!["BIG5".to_string()],
///     interpretations: true,
///     contributors: false,
/// };
///
/// let json = magic_sauce_sdk::run_prediction_handler(ClientConfig::from_env()?, request).await?;
/// println!("{json}");
/// # Ok(())
/// # }
/// ```
pub async fn run_prediction_handler(
    config: ClientConfig,
    request: PredictionRequest,
) -> Result<String, MagicSauceError> {
    let client = MagicSauceClient::new(config)?;
    let session = client
        .session(request.customer_id, request.api_key.as_deref())
        .await?;
    let options = request.options();

    let prediction = match &request.input {
        PredictionInput::Text { text, .. } => client.predict_text(text, &options, &session).await,
        PredictionInput::LikeIds { ids } => client.predict_like_ids(ids, &options, &session).await,
    }?;

    serde_json::to_string(&prediction).map_err(|err| MagicSauceError::Serialization(err.to_string()))
}
