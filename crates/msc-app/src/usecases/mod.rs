//! Business logic use cases
//!
//! raw input
//!     -> IdentifierExtractor (msc-core)
//!     -> DebounceGate
//!     -> BatchResolver  -> IdentityLookupPort (one call per owner)
//!     -> PreviewSubscription (consumer)

pub mod owner_preview;
