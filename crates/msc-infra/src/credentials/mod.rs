//! Credential providers for outgoing identity calls.

use msc_core::ports::CredentialProviderPort;

/// Reads the access token from an environment variable on every call, so a
/// token refreshed by the surrounding process is picked up immediately.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl CredentialProviderPort for EnvCredentialProvider {
    fn access_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().and_then(non_blank)
    }
}

/// Fixed token (or none), handed over by whoever owns the login session.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    token: Option<String>,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: non_blank(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl CredentialProviderPort for StaticCredentialProvider {
    fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

fn non_blank(token: String) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
