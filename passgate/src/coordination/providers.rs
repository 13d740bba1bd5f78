use crate::config::AUTH_CONFIG;
use crate::provider::ProviderInfo;

/// Public description of every configured provider, in registry order.
pub fn list_providers() -> Vec<ProviderInfo> {
    AUTH_CONFIG.providers.iter().map(|p| p.info()).collect()
}
