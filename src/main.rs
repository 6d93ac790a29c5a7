use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use multisig_console_lib::bootstrap::{
    apply_env_overrides, init_tracing_subscriber, resolve_config, wire_dependencies,
};
use multisig_console_lib::run_console;
use tokio::io::BufReader;
use tracing::{debug, info, warn};

/// Resolve multisig owner identifiers while they are typed.
///
/// Reads the owner field from stdin one line at a time and prints every
/// preview state as a JSON line on stdout. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "multisig-console", version, about)]
struct Cli {
    /// TOML config file; built-in defaults are used without one.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the debounce quiet period.
    #[arg(long, value_name = "MS")]
    quiet_period_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();

    init_tracing_subscriber()?;
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let mut config = apply_env_overrides(resolve_config(cli.config)?, |key| {
        std::env::var(key).ok()
    });
    if let Some(ms) = cli.quiet_period_ms {
        config.owner_preview.quiet_period = Duration::from_millis(ms);
    }

    let deps = wire_dependencies(&config)?;

    match deps.identity.current_identity().await {
        Ok(user) => info!(
            operator = %user.display_name(),
            user_id = user.id,
            "signed in to identity service"
        ),
        Err(err) => warn!(error = %err, "could not resolve the current identity"),
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let settled = run_console(&deps.session, stdin, tokio::io::stdout()).await?;
    info!(owners = settled.entries.len(), "console finished");

    Ok(())
}
