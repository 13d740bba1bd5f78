//! Redirect targets for the HTTP handlers

use std::sync::LazyLock;

/// Where a successful sign-in lands.
/// Default: "/"
pub static PASSGATE_REDIRECT_USER: LazyLock<String> =
    LazyLock::new(|| std::env::var("PASSGATE_REDIRECT_USER").unwrap_or_else(|_| "/".to_string()));

/// Where sign-out and rejected page requests land.
/// Default: "/"
pub static PASSGATE_REDIRECT_ANON: LazyLock<String> =
    LazyLock::new(|| std::env::var("PASSGATE_REDIRECT_ANON").unwrap_or_else(|_| "/".to_string()));
