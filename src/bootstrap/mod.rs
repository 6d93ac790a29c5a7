//! # Bootstrap
//!
//! Everything that runs once before the console starts reading input:
//! configuration loading, tracing setup and dependency wiring. Nothing in
//! here makes preview decisions.

pub mod config;
pub mod tracing;
pub mod wiring;

pub use self::config::{apply_env_overrides, load_config, resolve_config};
pub use self::tracing::init_tracing_subscriber;
pub use self::wiring::{wire_dependencies, AppDeps};
