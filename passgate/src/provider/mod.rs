//! Sign-in providers known to the application.

mod types;

pub use types::{
    CredentialField, CredentialsProvider, OAuthProvider, Provider, ProviderInfo, ProviderKind,
};
