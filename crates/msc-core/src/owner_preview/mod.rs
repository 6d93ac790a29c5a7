//! Owner preview domain: identifier extraction and the published preview state.
//!
//! Raw operator input is parsed into an [`IdentifierList`]; the application layer
//! resolves each identifier and publishes [`PublishedState`] snapshots made of
//! [`PreviewEntry`] values, one per identifier, tagged by [`Generation`].

mod extract;
mod state;

pub use extract::{extract_owner_ids, IdentifierExtractor, IdentifierList, DEFAULT_SEPARATORS};
pub use state::{Generation, PreviewEntry, PreviewStatus, PublishedState};
