//! # Configuration DTOs
//!
//! Data structures for the console configuration and their TOML mapping.
//! Missing keys take the value from [`AppConfig::defaults`]; present keys of the
//! wrong type are reported as [`ConfigError::InvalidValue`].

use std::time::Duration;

use crate::owner_preview::{IdentifierExtractor, DEFAULT_SEPARATORS};

/// Multisig service base URL used when nothing else is configured.
pub const DEFAULT_IDENTITY_BASE_URL: &str = "http://localhost:9010/api/v1/multisig";
/// Environment variable holding the bearer token for identity calls.
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "MULTISIG_ACCESS_TOKEN";
/// Shown for a failed lookup whose failure carries no reason.
pub const DEFAULT_LOOKUP_ERROR_MESSAGE: &str = "owner not found";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("invalid identity base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub identity: IdentityServiceConfig,
    pub owner_preview: OwnerPreviewConfig,
}

/// Where and how the identity lookup collaborator is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityServiceConfig {
    /// Multisig service base, e.g. `http://host/api/v1/multisig`.
    pub base_url: String,
    /// Name of the environment variable the access token is read from.
    pub access_token_env: String,
    /// Whole-request timeout for the HTTP client.
    pub request_timeout: Duration,
}

/// Owner preview pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerPreviewConfig {
    /// Input must be stable this long before a resolution run starts.
    pub quiet_period: Duration,
    /// Token separators in addition to whitespace.
    pub separators: Vec<char>,
    /// Message for failures that carry no reason.
    pub default_error_message: String,
    /// Per-lookup timeout; `None` waits for the collaborator indefinitely.
    pub lookup_timeout: Option<Duration>,
}

impl OwnerPreviewConfig {
    pub fn defaults() -> Self {
        Self {
            quiet_period: Duration::from_millis(350),
            separators: DEFAULT_SEPARATORS.to_vec(),
            default_error_message: DEFAULT_LOOKUP_ERROR_MESSAGE.to_string(),
            lookup_timeout: None,
        }
    }

    pub fn extractor(&self) -> IdentifierExtractor {
        IdentifierExtractor::new(self.separators.iter().copied())
    }
}

impl Default for OwnerPreviewConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl IdentityServiceConfig {
    pub fn defaults() -> Self {
        Self {
            base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            access_token_env: DEFAULT_ACCESS_TOKEN_ENV.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    pub fn defaults() -> Self {
        Self {
            identity: IdentityServiceConfig::defaults(),
            owner_preview: OwnerPreviewConfig::defaults(),
        }
    }

    /// Create AppConfig from a parsed TOML document.
    pub fn from_toml(toml_value: &toml::Value) -> Result<Self, ConfigError> {
        let defaults = Self::defaults();
        let identity = toml_value.get("identity");
        let preview = toml_value.get("owner_preview");

        let identity = IdentityServiceConfig {
            base_url: string_key(identity, "identity.base_url", "base_url")?
                .unwrap_or(defaults.identity.base_url),
            access_token_env: string_key(identity, "identity.access_token_env", "access_token_env")?
                .unwrap_or(defaults.identity.access_token_env),
            request_timeout: millis_key(identity, "identity.request_timeout_ms", "request_timeout_ms")?
                .unwrap_or(defaults.identity.request_timeout),
        };

        let lookup_timeout =
            match millis_key(preview, "owner_preview.lookup_timeout_ms", "lookup_timeout_ms")? {
                Some(timeout) if timeout.is_zero() => None,
                Some(timeout) => Some(timeout),
                None => defaults.owner_preview.lookup_timeout,
            };

        let owner_preview = OwnerPreviewConfig {
            quiet_period: millis_key(preview, "owner_preview.quiet_period_ms", "quiet_period_ms")?
                .unwrap_or(defaults.owner_preview.quiet_period),
            separators: string_key(preview, "owner_preview.separators", "separators")?
                .map(|s| s.chars().collect())
                .unwrap_or(defaults.owner_preview.separators),
            default_error_message: string_key(
                preview,
                "owner_preview.default_error_message",
                "default_error_message",
            )?
            .unwrap_or(defaults.owner_preview.default_error_message),
            lookup_timeout,
        };

        Ok(Self {
            identity,
            owner_preview,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

fn string_key(
    table: Option<&toml::Value>,
    full_key: &str,
    key: &str,
) -> Result<Option<String>, ConfigError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ConfigError::InvalidValue {
            key: full_key.to_string(),
            reason: format!("expected a string, found {}", other.type_str()),
        }),
    }
}

fn millis_key(
    table: Option<&toml::Value>,
    full_key: &str,
    key: &str,
) -> Result<Option<Duration>, ConfigError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(toml::Value::Integer(ms)) => u64::try_from(*ms)
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidValue {
                key: full_key.to_string(),
                reason: format!("expected a non-negative number of milliseconds, found {ms}"),
            }),
        Some(other) => Err(ConfigError::InvalidValue {
            key: full_key.to_string(),
            reason: format!("expected an integer, found {}", other.type_str()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<AppConfig, ConfigError> {
        let value: toml::Value = toml::from_str(content).unwrap();
        AppConfig::from_toml(&value)
    }

    #[test]
    fn test_from_toml_reads_all_sections() {
        let config = parse(
            r#"
            [identity]
            base_url = "https://gateway.example/multisig"
            access_token_env = "CONSOLE_TOKEN"
            request_timeout_ms = 2500

            [owner_preview]
            quiet_period_ms = 500
            separators = "|"
            default_error_message = "unknown owner"
            lookup_timeout_ms = 4000
            "#,
        )
        .unwrap();

        assert_eq!(config.identity.base_url, "https://gateway.example/multisig");
        assert_eq!(config.identity.access_token_env, "CONSOLE_TOKEN");
        assert_eq!(config.identity.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.owner_preview.quiet_period, Duration::from_millis(500));
        assert_eq!(config.owner_preview.separators, vec!['|']);
        assert_eq!(config.owner_preview.default_error_message, "unknown owner");
        assert_eq!(
            config.owner_preview.lookup_timeout,
            Some(Duration::from_millis(4000))
        );
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, AppConfig::defaults());
        assert_eq!(config.owner_preview.quiet_period, Duration::from_millis(350));
        assert_eq!(config.owner_preview.lookup_timeout, None);
    }

    #[test]
    fn test_zero_lookup_timeout_disables_it() {
        let config = parse("[owner_preview]\nlookup_timeout_ms = 0").unwrap();
        assert_eq!(config.owner_preview.lookup_timeout, None);
    }

    #[test]
    fn test_wrong_types_are_reported_with_key() {
        let err = parse("[owner_preview]\nquiet_period_ms = \"fast\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "owner_preview.quiet_period_ms"
        ));

        let err = parse("[owner_preview]\nquiet_period_ms = -5").unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_extractor_uses_configured_separators() {
        let mut preview = OwnerPreviewConfig::defaults();
        preview.separators = vec!['/'];
        let list = preview.extractor().extract("1/2,3");
        assert_eq!(list.len(), 2);
    }
}
