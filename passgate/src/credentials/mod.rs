//! Email and password sign-in.
//!
//! [`authorize`] turns submitted credentials into an [`Identity`] by looking
//! the user up by email and comparing the password against the stored bcrypt
//! hash. Every failure after the credentials are present collapses into
//! [`CredentialError::InvalidCredentials`].

mod authorize;
mod errors;
mod password;
mod types;

pub use authorize::{UserLookup, authorize, authorize_with};
pub use errors::CredentialError;
pub use password::{hash_password, verify_password};
pub use types::{Credentials, Identity};
