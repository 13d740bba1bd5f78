use chrono::Utc;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use serial_test::serial;

use passgate::{
    CoordinationError, Credentials, ProviderKind, User, UserStore, credentials_signin_core,
    get_server_auth_session, hash_password, list_providers, prepare_logout_response,
    resolve_session,
};

async fn setup() {
    dotenvy::from_filename(".env_test").ok();
    passgate::init().await.expect("passgate init");
}

async fn seed_user(password: &str) -> User {
    let ts = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let user = User::new(
        format!("it-user-{ts}"),
        Some("Integration".to_string()),
        Some(format!("it-{ts}@x.com")),
    )
    .with_password_hash(hash_password(password).expect("hash"));
    UserStore::upsert_user(user).await.expect("seed user")
}

/// Turn the `Set-Cookie` of a response into the `Cookie` of the next request.
fn as_request_cookie(response_headers: &HeaderMap) -> HeaderMap {
    let pair = response_headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("Set-Cookie present")
        .to_string();
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&pair).expect("header value"));
    headers
}

#[tokio::test]
#[serial]
async fn test_credentials_sign_in_then_read_session() {
    // Given a user with a password
    setup().await;
    let user = seed_user("secret").await;
    let email = user.email.clone().expect("email");

    // When they sign in
    let (response_headers, identity) =
        credentials_signin_core(Some(Credentials::new(email.clone(), "secret")))
            .await
            .expect("sign in");

    // Then the session cookie resolves to a shaped session for that user
    assert_eq!(identity.id, user.id);
    let request = as_request_cookie(&response_headers);
    let session = get_server_auth_session(&request)
        .await
        .expect("lookup")
        .expect("session");

    assert_eq!(session.user.id.as_deref(), Some(user.id.as_str()));
    assert_eq!(session.user.email.as_deref(), Some(email.as_str()));
    assert_eq!(session.user.name.as_deref(), Some("Integration"));
    let remaining = session.expires - Utc::now();
    assert!(remaining.num_seconds() > 3590 && remaining.num_seconds() <= 3600);
}

#[tokio::test]
#[serial]
async fn test_fresh_session_is_not_refreshed() {
    setup().await;
    let user = seed_user("secret").await;
    let email = user.email.clone().expect("email");
    let (response_headers, _) = credentials_signin_core(Some(Credentials::new(email, "secret")))
        .await
        .expect("sign in");

    let resolved = resolve_session(&as_request_cookie(&response_headers))
        .await
        .expect("lookup")
        .expect("session");

    assert!(resolved.refreshed.is_none());
}

#[tokio::test]
#[serial]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    setup().await;
    let user = seed_user("secret").await;
    let email = user.email.clone().expect("email");

    let wrong = credentials_signin_core(Some(Credentials::new(email, "wrong")))
        .await
        .expect_err("wrong password");
    let unknown = credentials_signin_core(Some(Credentials::new("nobody@x.com", "secret")))
        .await
        .expect_err("unknown email");

    assert!(matches!(wrong, CoordinationError::InvalidCredentials));
    assert!(matches!(unknown, CoordinationError::InvalidCredentials));
    assert_eq!(wrong.to_string(), "Invalid credentials");
}

#[tokio::test]
#[serial]
async fn test_sign_out_ends_session() {
    setup().await;
    let user = seed_user("secret").await;
    let email = user.email.clone().expect("email");
    let (response_headers, _) = credentials_signin_core(Some(Credentials::new(email, "secret")))
        .await
        .expect("sign in");
    let request = as_request_cookie(&response_headers);

    let logout_headers = prepare_logout_response(&request).await.expect("logout");

    let expired = logout_headers
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie");
    assert!(expired.contains("Max-Age=-86400"));
    assert!(
        get_server_auth_session(&request)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn test_anonymous_request_has_no_session() {
    setup().await;

    let session = get_server_auth_session(&HeaderMap::new())
        .await
        .expect("lookup");

    assert!(session.is_none());
}

#[tokio::test]
#[serial]
async fn test_registry_lists_google_then_credentials() {
    setup().await;

    let kinds: Vec<(String, ProviderKind)> = list_providers()
        .into_iter()
        .map(|p| (p.id, p.kind))
        .collect();

    assert_eq!(
        kinds,
        vec![
            ("google".to_string(), ProviderKind::OAuth),
            ("credentials".to_string(), ProviderKind::Credentials),
        ]
    );
}
