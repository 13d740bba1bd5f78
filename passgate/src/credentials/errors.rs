use thiserror::Error;

use crate::userdb::UserError;

#[derive(Debug, Error, Clone)]
pub enum CredentialError {
    /// Unknown email and wrong password are deliberately the same error.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hash error: {0}")]
    Hash(String),

    #[error("User error: {0}")]
    User(#[from] UserError),
}

impl From<bcrypt::BcryptError> for CredentialError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Hash(err.to_string())
    }
}
