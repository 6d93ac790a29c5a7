use serde::{Deserialize, Serialize};

/// Identity profile as served by the identity service.
///
/// Timestamps are kept exactly as the service renders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_non_expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_non_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_non_expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl IdentityUser {
    /// Minimal profile, mostly useful for fakes and fixtures.
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            avatar_url: None,
            enabled: None,
            account_non_expired: None,
            account_non_locked: None,
            credentials_non_expired: None,
            created_at: None,
            updated_at: None,
            last_login_at: None,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// "First Last" when a name is known, otherwise the username.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }
}
