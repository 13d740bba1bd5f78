//! Sign-in and sign-out flows
//!
//! Functions here tie the provider registry, the credential verifier, the
//! OAuth2 client and the session store together. HTTP integrations call
//! these rather than the lower layers.

mod credentials;
mod errors;
mod oauth2;
mod providers;

pub use credentials::credentials_signin_core;
pub use errors::CoordinationError;
pub use oauth2::{list_linked_accounts, oauth2_callback_core, oauth2_signin_core};
pub use providers::list_providers;
