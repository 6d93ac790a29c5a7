use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::identity::IdentityUser;
use crate::ids::OwnerId;

/// Identifies one resolution attempt for one identifier list snapshot.
///
/// Generations are allocated in strictly increasing order; only the most
/// recently allocated one may still publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Per-identifier resolution status. The profile exists only on success and
/// the message only on error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PreviewStatus {
    Loading,
    Success { profile: IdentityUser },
    Error { message: String },
}

impl PreviewStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, PreviewStatus::Loading)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub status: PreviewStatus,
}

impl PreviewEntry {
    pub fn loading(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            status: PreviewStatus::Loading,
        }
    }

    pub fn success(owner_id: OwnerId, profile: IdentityUser) -> Self {
        Self {
            owner_id,
            status: PreviewStatus::Success { profile },
        }
    }

    pub fn error(owner_id: OwnerId, message: impl Into<String>) -> Self {
        Self {
            owner_id,
            status: PreviewStatus::Error {
                message: message.into(),
            },
        }
    }

    pub fn profile(&self) -> Option<&IdentityUser> {
        match &self.status {
            PreviewStatus::Success { profile } => Some(profile),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            PreviewStatus::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// The only state visible to preview consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishedState {
    pub entries: Vec<PreviewEntry>,
    pub loading: bool,
}

impl PublishedState {
    /// Empty, non-loading state published when there is nothing to resolve.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn owner_ids(&self) -> Vec<&OwnerId> {
        self.entries.iter().map(|entry| &entry.owner_id).collect()
    }

    pub fn is_settled(&self) -> bool {
        !self.loading && self.entries.iter().all(|entry| entry.status.is_settled())
    }
}
