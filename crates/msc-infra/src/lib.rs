//! Infrastructure adapters for the multisig console.

pub mod credentials;
pub mod identity;

pub use credentials::{EnvCredentialProvider, StaticCredentialProvider};
pub use identity::HttpIdentityLookup;
