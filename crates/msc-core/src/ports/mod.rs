//! Port interfaces for the application layer
//!
//! Ports define the contract between the owner preview use cases and the
//! infrastructure that reaches the identity service. Use cases depend only on
//! these traits; adapters live in `msc-infra`.

pub mod credentials;
pub mod identity_lookup;

pub use credentials::CredentialProviderPort;
pub use identity_lookup::{IdentityLookupError, IdentityLookupPort};
