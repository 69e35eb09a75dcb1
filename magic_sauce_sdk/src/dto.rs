use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bearer credential returned by the `/auth` endpoint.
///
/// * `token` is the opaque string sent as `X-Auth-Token` on prediction calls.
/// * `expires` is kept as the raw integer the API returns. The upstream
///   documentation calls it a timestamp but it does not follow any standard
///   encoding, so no conversion is attempted.
/// * `usage_limits` lists the per-method call quotas attached to the token.
///
/// Tokens are immutable values. Renewal produces a fresh `Token` for the same
/// `customer_id`; see [`crate::auth::AuthSession`] for swapping the current one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub customer_id: u64,
    pub expires: i64,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub usage_limits: Vec<UsageLimit>,
}

impl Token {
    /// Returns `true` when the token was granted the named permission.
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|permission| permission == name)
    }

    /// Usage limit entry for an API method such as `"like_ids"`.
    pub fn usage_limit(&self, method: &str) -> Option<&UsageLimit> {
        self.usage_limits.iter().find(|limit| limit.method == method)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Call quota for a single API method.
///
/// Serialized with the camelCase keys used on the wire (`callsLimit`,
/// `callsAvailableSince`, ...). `calls_available_since` is the last quota reset
/// as Unix epoch milliseconds.
pub struct UsageLimit {
    pub method: String,
    pub calls_limit: i64,
    pub calls_available: i64,
    pub calls_available_since: i64,
    pub calls_renewal: bool,
    pub calls_renewal_days: i64,
}

impl UsageLimit {
    /// Last quota reset as a UTC timestamp, `None` when out of range.
    pub fn available_since(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.calls_available_since).single()
    }

    pub fn is_exhausted(&self) -> bool {
        self.calls_available <= 0
    }
}

/// Numeric prediction for one trait.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraitScore {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub value: f64,
}

/// Human readable interpretation of a trait.
///
/// The API returns strings for most traits but numbers or objects for some,
/// so the value is kept as raw JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TraitInterpretation {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub value: serde_json::Value,
}

/// Inputs (e.g. individual likes) that pushed a trait up or down.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraitContributors {
    #[serde(rename = "trait")]
    pub trait_name: String,
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
/// Response of the `/text` and `/like_ids` prediction endpoints.
///
/// * `input_used` counts the items the API actually used, which can be lower
///   than what was sent when unsupported languages or unknown likes are
///   filtered out.
/// * `interpretations` and `contributors` are only populated when requested
///   through [`crate::options::PredictionOptions`].
///
/// A `204 No Content` answer is represented by `PredictionResult::default()`.
pub struct PredictionResult {
    #[serde(default)]
    pub input_used: u64,
    #[serde(default)]
    pub predictions: Vec<TraitScore>,
    #[serde(default)]
    pub interpretations: Vec<TraitInterpretation>,
    #[serde(default)]
    pub contributors: Vec<TraitContributors>,
}

impl PredictionResult {
    /// Score for the named trait, if it was predicted.
    pub fn score(&self, trait_name: &str) -> Option<f64> {
        self.predictions
            .iter()
            .find(|prediction| prediction.trait_name == trait_name)
            .map(|prediction| prediction.value)
    }

    pub fn is_empty(&self) -> bool {
        self.input_used == 0 && self.predictions.is_empty()
    }
}

#[derive(Debug, Error)]
/// Errors returned by the SDK when authenticating or requesting predictions.
///
/// [`MagicSauceError::Network`] and [`MagicSauceError::Timeout`] come from the
/// transport and never carry an API status; every other variant describes an
/// answer the API actually gave.
pub enum MagicSauceError {
    #[error("network call failed: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("authentication failure")]
    AuthenticationFailure,
    #[error("endpoint not found")]
    EndpointNotFound,
    #[error("api is temporarily not available")]
    ServiceUnavailable,
    #[error("usage limit exceeded: {0}")]
    UsageLimitExceeded(String),
    #[error("authentication token expired")]
    TokenExpired,
    #[error("could not renew authentication token: {0}")]
    RenewalFailed(#[source] Box<MagicSauceError>),
    #[error("failed to deserialize response: {0}")]
    Serialization(String),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MagicSauceError {
    /// `true` for failures that happened before any HTTP status was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, MagicSauceError::Network(_) | MagicSauceError::Timeout)
    }

    /// Map a non-success status shared by every endpoint to an error.
    ///
    /// `403` is endpoint specific (wrong credentials on `/auth`, expired token
    /// on the prediction routes) and maps to [`MagicSauceError::AuthenticationFailure`]
    /// here; the prediction client intercepts it before calling this.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => MagicSauceError::BadRequest(body),
            StatusCode::FORBIDDEN => MagicSauceError::AuthenticationFailure,
            StatusCode::NOT_FOUND => MagicSauceError::EndpointNotFound,
            StatusCode::TOO_MANY_REQUESTS => MagicSauceError::UsageLimitExceeded(body),
            StatusCode::INTERNAL_SERVER_ERROR => MagicSauceError::ServiceUnavailable,
            other => MagicSauceError::UnexpectedStatus {
                status: other.as_u16(),
                body,
            },
        }
    }
}

impl From<reqwest::Error> for MagicSauceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MagicSauceError::Timeout
        } else {
            MagicSauceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MagicSauceError {
    fn from(err: serde_json::Error) -> Self {
        MagicSauceError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MagicSauceError>;
