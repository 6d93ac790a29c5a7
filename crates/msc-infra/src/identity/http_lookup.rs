use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use msc_core::config::ConfigError;
use msc_core::ports::{CredentialProviderPort, IdentityLookupError, IdentityLookupPort};
use msc_core::{IdentityServiceConfig, IdentityUser, OwnerId};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, debug_span, Instrument};

use super::envelope::{ApiEnvelope, ErrorBody};

const USER_FALLBACK: &str = "failed to fetch identity user";
const CURRENT_USER_FALLBACK: &str = "failed to fetch current identity user";

/// Identity lookup over the multisig service's REST API.
///
/// - `GET {base}/users/{id}` resolves one owner.
/// - `GET {base}/users/profile` returns the caller's own identity.
///
/// Every request carries `Authorization: Bearer <token>` when the injected
/// credential provider has a token.
pub struct HttpIdentityLookup {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProviderPort>,
}

impl HttpIdentityLookup {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        credentials: Arc<dyn CredentialProviderPort>,
    ) -> anyhow::Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build identity HTTP client")?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn from_config(
        config: &IdentityServiceConfig,
        credentials: Arc<dyn CredentialProviderPort>,
    ) -> anyhow::Result<Self> {
        Self::new(&config.base_url, config.request_timeout, credentials)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Identity of the operator the access token belongs to.
    pub async fn current_identity(&self) -> Result<IdentityUser, IdentityLookupError> {
        let url = self.endpoint(&["users", "profile"])?;
        self.fetch_user(url, None, CURRENT_USER_FALLBACK)
            .instrument(debug_span!("infra.identity.current_identity"))
            .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IdentityLookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                IdentityLookupError::Transport(format!("invalid identity base url: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch_user(
        &self,
        url: Url,
        owner_id: Option<&OwnerId>,
        fallback: &str,
    ) -> Result<IdentityUser, IdentityLookupError> {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = self.credentials.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IdentityLookupError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| IdentityLookupError::Transport(e.to_string()))?;
        debug!(status = %status, bytes = body.len(), "identity service responded");

        if !status.is_success() {
            return Err(match (ErrorBody::parse(&body).reason(), owner_id) {
                (Some(reason), _) => IdentityLookupError::Rejected(reason),
                (None, Some(owner_id)) if status == StatusCode::NOT_FOUND => {
                    IdentityLookupError::NotFound {
                        owner_id: owner_id.clone(),
                    }
                }
                (None, _) => {
                    IdentityLookupError::Rejected(format!("identity service returned {status}"))
                }
            });
        }

        let envelope: ApiEnvelope<IdentityUser> = serde_json::from_slice(&body).map_err(|e| {
            IdentityLookupError::Transport(format!("invalid identity response: {e}"))
        })?;
        envelope
            .into_data(fallback)
            .map_err(IdentityLookupError::Rejected)
    }
}

#[async_trait]
impl IdentityLookupPort for HttpIdentityLookup {
    async fn lookup_identity(
        &self,
        owner_id: &OwnerId,
    ) -> Result<IdentityUser, IdentityLookupError> {
        let url = self.endpoint(&["users", owner_id.as_str()])?;
        self.fetch_user(url, Some(owner_id), USER_FALLBACK)
            .instrument(debug_span!("infra.identity.lookup", owner_id = %owner_id))
            .await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) url".to_string(),
        });
    }
    Ok(url)
}
