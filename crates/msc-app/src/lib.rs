//! Multisig console application layer
//!
//! This crate contains the owner preview use cases and their runtime orchestration.

pub mod usecases;

pub use usecases::owner_preview::{
    BatchResolver, DebounceGate, OwnerPreviewSession, PreviewSubscription, ResolverOptions,
};
