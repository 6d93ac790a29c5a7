//! # msc-core
//!
//! Core domain models and ports for the multisig console.
//!
//! This crate contains pure domain logic without any infrastructure dependencies.

// Public module exports
pub mod config;
pub mod identity;
pub mod ids;
pub mod owner_preview;
pub mod ports;

// Re-export commonly used types at the crate root
pub use config::{AppConfig, IdentityServiceConfig, OwnerPreviewConfig};
pub use identity::IdentityUser;
pub use ids::OwnerId;
pub use owner_preview::{
    extract_owner_ids, Generation, IdentifierExtractor, IdentifierList, PreviewEntry,
    PreviewStatus, PublishedState,
};
