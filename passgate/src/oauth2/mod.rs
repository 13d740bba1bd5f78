mod config;
mod errors;
mod main;
mod storage;
mod types;

pub use errors::OAuth2Error;
pub use types::{AuthResponse, OAuth2Account};

pub(crate) use config::{
    OAUTH2_AUTH_URL, OAUTH2_CSRF_COOKIE_NAME, OAUTH2_SCOPE, OAUTH2_TOKEN_URL, OAUTH2_USERINFO_URL,
};
pub(crate) use main::{csrf_checks, fetch_user_info, prepare_oauth2_auth_request};
pub(crate) use storage::OAuth2Store;

pub(crate) async fn init() -> Result<(), OAuth2Error> {
    // Fails when ORIGIN is unset
    config::redirect_uri("google")?;

    OAuth2Store::init().await
}
