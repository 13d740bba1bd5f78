use std::sync::LazyLock;

/// Lifetime of a session in seconds.
pub const SESSION_MAX_AGE: u64 = 60 * 60;

/// Minimum number of seconds between two expiry extensions of the same session.
pub const SESSION_UPDATE_AGE: u64 = 10;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-SessionId".to_string())
});

pub(super) const SESSION_CACHE_PREFIX: &str = "session";
