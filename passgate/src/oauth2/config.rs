use std::{env, sync::LazyLock};

use crate::config::PASSGATE_ROUTE_PREFIX;

use super::errors::OAuth2Error;

pub(crate) static OAUTH2_AUTH_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("OAUTH2_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string())
});

pub(crate) static OAUTH2_TOKEN_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("OAUTH2_TOKEN_URL").unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string())
});

pub(crate) static OAUTH2_USERINFO_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("OAUTH2_USERINFO_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v2/userinfo".to_string())
});

pub(crate) static OAUTH2_SCOPE: LazyLock<String> =
    LazyLock::new(|| env::var("OAUTH2_SCOPE").unwrap_or_else(|_| "openid email profile".to_string()));

// "__Host-" prefix are added to make cookies "host-only".

pub(crate) static OAUTH2_CSRF_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("OAUTH2_CSRF_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-CsrfId".to_string())
});

pub(super) static OAUTH2_CSRF_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("OAUTH2_CSRF_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(300)
});

static ORIGIN: LazyLock<Option<String>> = LazyLock::new(|| {
    env::var("ORIGIN")
        .ok()
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
});

/// Callback URL registered with the provider: `{ORIGIN}{prefix}/callback/{provider_id}`.
pub(crate) fn redirect_uri(provider_id: &str) -> Result<String, OAuth2Error> {
    let origin = ORIGIN
        .as_deref()
        .ok_or_else(|| OAuth2Error::Config("Missing ORIGIN".to_string()))?;
    Ok(format!(
        "{origin}{}/callback/{provider_id}",
        PASSGATE_ROUTE_PREFIX.as_str()
    ))
}
