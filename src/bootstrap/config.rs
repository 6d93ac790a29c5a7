//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read the TOML config file / 读取 TOML 配置文件
//! - ✅ Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//! - ✅ Layer environment overrides on top / 叠加环境变量覆盖
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No per-key typing rules / 禁止逐键类型规则**
//! - They live in [`AppConfig::from_toml`]
//! - 它们位于 [`AppConfig::from_toml`]
//!
//! ❌ **No reachability checks / 禁止连通性检查**
//! - The base URL is validated when the HTTP client is built
//! - 基础 URL 在构建 HTTP 客户端时校验

use std::path::PathBuf;

use anyhow::Context;
use msc_core::AppConfig;

/// Multisig service root; the API path is appended to it.
pub const SERVICE_URL_ENV: &str = "MULTISIG_SERVICE_URL";
/// Overrides the name of the variable the access token is read from.
pub const ACCESS_TOKEN_ENV_OVERRIDE: &str = "MULTISIG_ACCESS_TOKEN_ENV";

const SERVICE_API_PATH: &str = "/api/v1/multisig";

/// Load configuration from a TOML file.
///
/// Missing keys fall back to [`AppConfig::defaults`].
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
/// - A present key has the wrong type or an unusable value
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// The config file when one is given, built-in defaults otherwise.
pub fn resolve_config(config_path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => Ok(AppConfig::defaults()),
    }
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` is `std::env::var` in production; tests pass a map. Blank
/// values are treated as unset.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(service) = lookup(SERVICE_URL_ENV)
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
    {
        config.identity.base_url = format!("{service}{SERVICE_API_PATH}");
    }

    if let Some(var) = lookup(ACCESS_TOKEN_ENV_OVERRIDE)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        config.identity.access_token_env = var;
    }

    config
}
