//! Central configuration for the passgate crate

use std::sync::LazyLock;
use thiserror::Error;

use crate::provider::{CredentialsProvider, OAuthProvider, Provider};
use crate::session::SessionPolicy;

/// Route prefix for all passgate endpoints
///
/// Default: "/api/auth"
pub static PASSGATE_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("PASSGATE_ROUTE_PREFIX").unwrap_or_else(|_| "/api/auth".to_string())
});

/// The process-wide authentication configuration.
///
/// Built once from the environment. [`crate::init`] validates the environment
/// before anything dereferences this, so the `expect` only fires when the
/// crate is used without being initialized.
pub static AUTH_CONFIG: LazyLock<AuthConfig> = LazyLock::new(|| {
    AuthConfig::from_env().expect("GOOGLE_ID and GOOGLE_SECRET must be set")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),
}

/// Providers and session policy.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub providers: Vec<Provider>,
    pub session: SessionPolicy,
}

impl AuthConfig {
    /// Google OAuth from `GOOGLE_ID`/`GOOGLE_SECRET`, plus email/password sign-in.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };

        let client_id = required("GOOGLE_ID")?;
        let client_secret = required("GOOGLE_SECRET")?;

        Ok(Self {
            providers: vec![
                Provider::OAuth(OAuthProvider::google(client_id, client_secret)),
                Provider::Credentials(CredentialsProvider::email_password()),
            ],
            session: SessionPolicy::default(),
        })
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub fn oauth_provider(&self, id: &str) -> Option<&OAuthProvider> {
        match self.provider(id)? {
            Provider::OAuth(p) => Some(p),
            Provider::Credentials(_) => None,
        }
    }

    pub fn credentials_provider(&self) -> Option<&CredentialsProvider> {
        self.providers.iter().find_map(|p| match p {
            Provider::Credentials(c) => Some(c),
            Provider::OAuth(_) => None,
        })
    }
}
