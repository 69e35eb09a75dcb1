//! Client configuration.
//!
//! The default API key lives here instead of in process-wide state. It is used
//! whenever a call omits an explicit key and to renew expired tokens.

use std::time::Duration;

use figment::providers::Env;
use figment::Figment;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::dto::{MagicSauceError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.applymagicsauce.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const ENV_PREFIX: &str = "MAGIC_SAUCE_";

/// Settings injected into [`crate::MagicSauceClient`].
///
/// ```
/// use std::time::Duration;
/// use magic_sauce_sdk::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_api_key("secret")
///     .with_timeout(Duration::from_secs(10));
/// assert!(config.has_api_key());
/// ```
#[derive(Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    base_url: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

/// Figment parses env values, so an all-digit key arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Unsigned(num) => num.to_string(),
        Scalar::Signed(num) => num.to_string(),
        Scalar::Float(num) => num.to_string(),
        Scalar::Bool(flag) => flag.to_string(),
    }))
}

impl ClientConfig {
    /// Load `MAGIC_SAUCE_BASE_URL`, `MAGIC_SAUCE_API_KEY` and
    /// `MAGIC_SAUCE_TIMEOUT_SECS` from the environment, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_figment(Figment::new().merge(Env::prefixed(ENV_PREFIX)))?;
        // Numeric parsing drops leading zeros; keep the key exactly as set.
        if let Ok(api_key) = std::env::var(format!("{ENV_PREFIX}API_KEY")) {
            if !api_key.is_empty() {
                config.api_key = Some(SecretString::from(api_key));
            }
        }
        Ok(config)
    }

    /// Extract a configuration from any figment, e.g. one layering a file
    /// under the environment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let raw: RawConfig = figment
            .extract()
            .map_err(|err| MagicSauceError::Config(err.to_string()))?;

        let mut config = ClientConfig::default();
        if let Some(base_url) = raw.base_url.filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(api_key) = raw.api_key.filter(|key| !key.is_empty()) {
            config.api_key = Some(SecretString::from(api_key));
        }
        if let Some(secs) = raw.timeout_secs {
            if secs == 0 {
                return Err(MagicSauceError::Config(
                    "timeout_secs must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.is_empty() {
            None
        } else {
            Some(SecretString::from(api_key))
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;
    use figment::Jail;

    #[test]
    fn defaults_point_at_public_api() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.has_api_key());
    }

    #[test]
    fn empty_api_key_is_treated_as_unset() {
        let config = ClientConfig::default().with_api_key("");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ClientConfig::default().with_api_key("hunter2");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn loads_values_from_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("MAGIC_SAUCE_BASE_URL", "http://localhost:9999");
            jail.set_env("MAGIC_SAUCE_API_KEY", "env-key");
            jail.set_env("MAGIC_SAUCE_TIMEOUT_SECS", "5");

            let config = ClientConfig::from_env().expect("config should load");
            assert_eq!(config.base_url, "http://localhost:9999");
            assert_eq!(
                config.api_key.as_ref().map(|key| key.expose_secret().to_string()),
                Some("env-key".to_string())
            );
            assert_eq!(config.timeout, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn missing_environment_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ClientConfig::from_env().expect("config should load");
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert!(!config.has_api_key());
            Ok(())
        });
    }

    #[test]
    fn numeric_api_key_is_read_as_text() {
        Jail::expect_with(|jail| {
            jail.set_env("MAGIC_SAUCE_API_KEY", "1234567890");
            let config = ClientConfig::from_env().expect("numeric key should load");
            assert_eq!(
                config.api_key.as_ref().map(|key| key.expose_secret().to_string()),
                Some("1234567890".to_string())
            );

            jail.set_env("MAGIC_SAUCE_API_KEY", "007");
            let config = ClientConfig::from_env().expect("zero padded key should load");
            assert_eq!(
                config.api_key.as_ref().map(|key| key.expose_secret().to_string()),
                Some("007".to_string())
            );
            Ok(())
        });
    }

    #[test]
    fn numeric_api_key_from_any_provider() {
        let figment = Figment::new().merge(Serialized::default("api_key", 4242u64));
        let config = ClientConfig::from_figment(figment).expect("numeric key should load");
        assert_eq!(
            config.api_key.as_ref().map(|key| key.expose_secret().to_string()),
            Some("4242".to_string())
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("MAGIC_SAUCE_TIMEOUT_SECS", "0");
            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, MagicSauceError::Config(_)));
            Ok(())
        });
    }
}
