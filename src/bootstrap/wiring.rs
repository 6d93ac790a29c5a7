//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (credentials, identity HTTP client) / 创建 infra 层具体实现
//! - ✅ Inject them into the owner preview session / 将依赖注入到会话
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No preview logic / 禁止包含预览逻辑**
//! - Debouncing and resolution belong to `msc-app`
//! - 防抖与解析属于 `msc-app`
//!
//! > **This is the only place allowed to depend on msc-infra and msc-app at once.**
//! > **这是唯一允许同时依赖 msc-infra 和 msc-app 的地方。**

use std::sync::Arc;

use anyhow::Context;
use msc_app::OwnerPreviewSession;
use msc_core::ports::{CredentialProviderPort, IdentityLookupPort};
use msc_core::AppConfig;
use msc_infra::{EnvCredentialProvider, HttpIdentityLookup};
use tracing::info;

/// Assembled application dependencies.
pub struct AppDeps {
    /// Concrete client, kept for calls outside the lookup port such as
    /// resolving the operator's own identity.
    pub identity: Arc<HttpIdentityLookup>,
    pub session: OwnerPreviewSession,
}

/// Build every adapter from `config` and wire the owner preview session.
///
/// Must be called within a Tokio runtime.
pub fn wire_dependencies(config: &AppConfig) -> anyhow::Result<AppDeps> {
    let credentials: Arc<dyn CredentialProviderPort> = Arc::new(EnvCredentialProvider::new(
        config.identity.access_token_env.clone(),
    ));
    let identity = Arc::new(
        HttpIdentityLookup::from_config(&config.identity, credentials)
            .context("Failed to create identity lookup")?,
    );

    let lookup: Arc<dyn IdentityLookupPort> = identity.clone();
    let session = OwnerPreviewSession::new(lookup, &config.owner_preview);

    info!(
        base_url = %identity.base_url(),
        token_env = %config.identity.access_token_env,
        quiet_period_ms = config.owner_preview.quiet_period.as_millis() as u64,
        "dependencies wired"
    );

    Ok(AppDeps { identity, session })
}
