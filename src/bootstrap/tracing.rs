//! Tracing configuration for the console.
//!
//! Structured logs go to stderr; stdout carries the preview stream and must
//! stay machine-readable.

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Default filter directives, used when `RUST_LOG` is unset or invalid.
///
/// ## Behavior
/// - **Development**: debug level for the console crates
/// - **Production**: info level for the console crates
/// - HTTP stack internals are capped at warn in both
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let level = if is_dev { "debug" } else { "info" };
    vec![
        level.to_string(),
        "hyper=warn".to_string(),
        "hyper_util=warn".to_string(),
        "reqwest=warn".to_string(),
        "rustls=warn".to_string(),
        format!("msc_core={level}"),
        format!("msc_app={level}"),
        format!("msc_infra={level}"),
        format!("multisig_console_lib={level}"),
        format!("multisig_console={level}"),
    ]
}

/// Initialize the tracing subscriber.
///
/// Call once from `main`, before any use case runs.
///
/// ## Errors
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    // "2025-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(std::io::stderr);

    registry().with(env_filter).with(stderr_layer).try_init()?;

    Ok(())
}
