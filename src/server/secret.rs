use anyhow::{Result, anyhow};
use tracing::warn;

/// Used when no secret is configured and the settings allow it. Never for production.
pub const DEV_FALLBACK_SECRET: &str = "dev-secret-change";

/// Resolve the HMAC signing secret from the value of the configured
/// environment variable. Empty counts as unset.
pub fn resolve_signing_secret(
    env_name: &str,
    env_value: Option<String>,
    require_secret: bool,
) -> Result<Vec<u8>> {
    match env_value.filter(|value| !value.is_empty()) {
        Some(value) => Ok(value.into_bytes()),
        None if require_secret => Err(anyhow!(
            "signing secret required but environment variable {env_name} is not set"
        )),
        None => {
            warn!(
                env = env_name,
                "no signing secret configured, using the development fallback"
            );
            Ok(DEV_FALLBACK_SECRET.as_bytes().to_vec())
        }
    }
}
