use thiserror::Error;

use crate::config::ConfigError;
use crate::credentials::CredentialError;
use crate::oauth2::OAuth2Error;
use crate::session::SessionError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors surfaced by the sign-in and sign-out flows
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Unknown email or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The sign-in form was submitted without credentials
    #[error("No credentials submitted")]
    MissingCredentials,

    /// No provider with this id, or not of the kind the route expects
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The provider account's email belongs to a user it is not linked to
    #[error("Account not linked: {0}")]
    AccountNotLinked(String),

    #[error("Config error: {0}")]
    ConfigError(ConfigError),

    #[error("Credential error: {0}")]
    CredentialError(CredentialError),

    #[error("User error: {0}")]
    UserError(UserError),

    #[error("OAuth2 error: {0}")]
    OAuth2Error(OAuth2Error),

    #[error("Session error: {0}")]
    SessionError(SessionError),

    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidCredentials => tracing::info!("Invalid credentials"),
            Self::MissingCredentials => tracing::info!("No credentials submitted"),
            Self::UnknownProvider(id) => tracing::warn!("Unknown provider: {}", id),
            Self::AccountNotLinked(email) => tracing::warn!("Account not linked: {}", email),
            Self::ConfigError(err) => tracing::error!("Config error: {}", err),
            Self::CredentialError(err) => tracing::error!("Credential error: {}", err),
            Self::UserError(err) => tracing::error!("User error: {}", err),
            Self::OAuth2Error(err) => tracing::error!("OAuth2 error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

impl From<ConfigError> for CoordinationError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err).log()
    }
}

impl From<CredentialError> for CoordinationError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => Self::InvalidCredentials.log(),
            other => Self::CredentialError(other).log(),
        }
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        Self::UserError(err).log()
    }
}

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        Self::OAuth2Error(err).log()
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        Self::SessionError(err).log()
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        Self::UtilsError(err).log()
    }
}
