//! HTTP access to the identity endpoints of the multisig service.

mod envelope;
mod http_lookup;

pub use envelope::ApiEnvelope;
pub use http_lookup::HttpIdentityLookup;
