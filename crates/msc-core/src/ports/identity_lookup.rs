use async_trait::async_trait;

use crate::identity::IdentityUser;
use crate::ids::OwnerId;

/// Port for resolving an owner identifier to its identity profile.
///
/// No ordering or batching contract holds between calls; callers may issue
/// any number of lookups concurrently.
#[async_trait]
pub trait IdentityLookupPort: Send + Sync {
    async fn lookup_identity(&self, owner_id: &OwnerId)
        -> Result<IdentityUser, IdentityLookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityLookupError {
    #[error("identity {owner_id} not found")]
    NotFound { owner_id: OwnerId },

    /// The service answered but refused the request; carries its message.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),

    #[error("identity lookup timed out")]
    Timeout,

    /// Failure without any usable description.
    #[error("identity lookup failed")]
    Unspecified,
}

impl IdentityLookupError {
    /// Human-readable reason to show next to the failed identifier, if the
    /// failure carries one.
    pub fn reason(&self) -> Option<String> {
        match self {
            IdentityLookupError::Unspecified => None,
            IdentityLookupError::Rejected(message) | IdentityLookupError::Transport(message)
                if message.trim().is_empty() =>
            {
                None
            }
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_uses_service_message() {
        let err = IdentityLookupError::Rejected("user 7 is disabled".to_string());
        assert_eq!(err.reason().as_deref(), Some("user 7 is disabled"));
    }

    #[test]
    fn test_reason_is_none_without_description() {
        assert_eq!(IdentityLookupError::Unspecified.reason(), None);
        assert_eq!(IdentityLookupError::Rejected("  ".to_string()).reason(), None);
        assert_eq!(IdentityLookupError::Transport(String::new()).reason(), None);
    }

    #[test]
    fn test_not_found_and_timeout_reasons() {
        let err = IdentityLookupError::NotFound {
            owner_id: OwnerId::from("5"),
        };
        assert_eq!(err.reason().as_deref(), Some("identity 5 not found"));
        assert_eq!(
            IdentityLookupError::Timeout.reason().as_deref(),
            Some("identity lookup timed out")
        );
    }
}
