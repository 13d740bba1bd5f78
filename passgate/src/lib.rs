//! passgate - email/password and Google OAuth2 sign-in with server-side sessions
//!
//! The crate owns the authentication configuration (providers and session
//! policy), verifies submitted credentials against the user store, runs the
//! OAuth2 authorization-code flow, and issues sliding sessions backed by a
//! cache store. HTTP frameworks integrate through the `*_core` functions
//! and the session helpers.

mod config;
mod coordination;
mod credentials;
mod oauth2;
mod provider;
mod session;
mod storage;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{AUTH_CONFIG, AuthConfig, ConfigError, PASSGATE_ROUTE_PREFIX};

pub use coordination::{
    CoordinationError, credentials_signin_core, list_linked_accounts, list_providers,
    oauth2_callback_core, oauth2_signin_core,
};

pub use credentials::{
    CredentialError, Credentials, Identity, UserLookup, authorize, authorize_with,
    hash_password, verify_password,
};

pub use oauth2::{AuthResponse, OAuth2Account, OAuth2Error};

pub use provider::{
    CredentialField, CredentialsProvider, OAuthProvider, Provider, ProviderInfo, ProviderKind,
};

pub use session::{
    ResolvedSession, SESSION_COOKIE_NAME, SESSION_MAX_AGE, SESSION_UPDATE_AGE, Session,
    SessionError, SessionPolicy, SessionToken, SessionUser, get_server_auth_session,
    prepare_logout_response, resolve_session, shape_session,
};

pub use userdb::{User, UserError, UserSearchField, UserStore};

pub use utils::UtilError;

/// Validate configuration and prepare the stores.
///
/// Fails with [`ConfigError::MissingEnv`] when `GOOGLE_ID` or `GOOGLE_SECRET`
/// is unset, before any store is touched.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    AuthConfig::from_env()?;
    let _ = &*AUTH_CONFIG;

    storage::init().await?;
    userdb::init().await?;
    oauth2::init().await?;

    tracing::info!(
        providers = AUTH_CONFIG.providers.len(),
        route_prefix = %PASSGATE_ROUTE_PREFIX.as_str(),
        "passgate initialized"
    );
    Ok(())
}
