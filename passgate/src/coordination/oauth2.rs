use headers::Cookie;
use http::HeaderMap;

use crate::config::AUTH_CONFIG;
use crate::oauth2::{
    AuthResponse, OAUTH2_CSRF_COOKIE_NAME, OAuth2Account, OAuth2Store, csrf_checks,
    fetch_user_info, prepare_oauth2_auth_request,
};
use crate::provider::OAuthProvider;
use crate::session::create_session_with_uid;
use crate::userdb::{User, UserSearchField, UserStore};
use crate::utils::header_set_cookie;

use super::errors::CoordinationError;

fn oauth_provider(provider_id: &str) -> Result<&'static OAuthProvider, CoordinationError> {
    AUTH_CONFIG
        .oauth_provider(provider_id)
        .ok_or_else(|| CoordinationError::UnknownProvider(provider_id.to_string()).log())
}

/// Start an OAuth sign-in: the provider's authorization URL and the CSRF cookie.
pub async fn oauth2_signin_core(
    provider_id: &str,
    headers: &HeaderMap,
) -> Result<(String, HeaderMap), CoordinationError> {
    let provider = oauth_provider(provider_id)?;
    Ok(prepare_oauth2_auth_request(provider, headers).await?)
}

/// Finish an OAuth sign-in.
///
/// A known provider account signs in its user. A new account whose email
/// already belongs to a user fails with [`CoordinationError::AccountNotLinked`];
/// otherwise a user is created for it. Returns the session `Set-Cookie`
/// headers (with the CSRF cookie cleared) and the user id.
#[tracing::instrument(skip_all, fields(provider = %provider_id))]
pub async fn oauth2_callback_core(
    provider_id: &str,
    auth_response: &AuthResponse,
    cookies: &Cookie,
    headers: &HeaderMap,
) -> Result<(HeaderMap, String), CoordinationError> {
    let provider = oauth_provider(provider_id)?;

    let state = csrf_checks(provider_id, cookies, auth_response, headers).await?;
    let user_info = fetch_user_info(provider, auth_response, &state).await?;

    let account = OAuth2Account::from_userinfo(&provider.id, user_info);
    let user_id = resolve_account_user(account).await?;

    let mut response_headers = create_session_with_uid(&user_id, &AUTH_CONFIG.session).await?;
    header_set_cookie(
        &mut response_headers,
        OAUTH2_CSRF_COOKIE_NAME.as_str(),
        "value",
        -86400,
    )?;

    tracing::info!(user_id = %user_id, "Signed in with OAuth2");
    Ok((response_headers, user_id))
}

/// Provider accounts linked to `user_id`.
pub async fn list_linked_accounts(user_id: &str) -> Result<Vec<OAuth2Account>, CoordinationError> {
    Ok(OAuth2Store::get_accounts_by_user_id(user_id).await?)
}

/// Find or create the user behind a provider account and store the account's
/// latest profile.
async fn resolve_account_user(mut account: OAuth2Account) -> Result<String, CoordinationError> {
    if let Some(stored) =
        OAuth2Store::get_account_by_provider(&account.provider, &account.provider_account_id)
            .await?
    {
        account.id = stored.id;
        account.user_id = stored.user_id;
        account.created_at = stored.created_at;

        if UserStore::get_user(&account.user_id).await?.is_none() {
            tracing::warn!(user_id = %account.user_id, "Recreating missing user for linked account");
            UserStore::upsert_user(user_from_account(&account.user_id, &account)).await?;
        }

        let account = OAuth2Store::upsert_account(account).await?;
        return Ok(account.user_id);
    }

    if let Some(email) = account.email.as_deref() {
        let existing = UserStore::get_user_by(UserSearchField::Email(email.to_string())).await?;
        if existing.is_some() {
            return Err(CoordinationError::AccountNotLinked(email.to_string()).log());
        }
    }

    let user_id = uuid::Uuid::new_v4().to_string();
    let user = UserStore::upsert_user(user_from_account(&user_id, &account)).await?;

    account.user_id = user.id;
    let account = OAuth2Store::upsert_account(account).await?;

    tracing::info!(user_id = %account.user_id, "Created user for new OAuth2 account");
    Ok(account.user_id)
}

fn user_from_account(user_id: &str, account: &OAuth2Account) -> User {
    let mut user = User::new(
        user_id.to_string(),
        account.name.clone(),
        account.email.clone(),
    );
    user.image = account.picture.clone();
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use chrono::Utc;
    use serial_test::serial;

    fn new_account(suffix: &str, email: Option<String>) -> OAuth2Account {
        let now = Utc::now();
        OAuth2Account {
            id: String::new(),
            user_id: String::new(),
            provider: "google".to_string(),
            provider_account_id: format!("pid-{suffix}"),
            name: Some("Gina".to_string()),
            email,
            picture: Some("https://example.com/g.png".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn unique(tag: &str) -> String {
        format!(
            "{tag}-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        )
    }

    #[tokio::test]
    #[serial]
    async fn test_new_account_creates_user() {
        init_test_environment().await;
        let suffix = unique("new");
        let email = format!("{suffix}@x.com");

        let user_id = resolve_account_user(new_account(&suffix, Some(email.clone())))
            .await
            .expect("resolve");

        let user = UserStore::get_user(&user_id)
            .await
            .expect("lookup")
            .expect("user created");
        assert_eq!(user.email.as_deref(), Some(email.as_str()));
        assert_eq!(user.image.as_deref(), Some("https://example.com/g.png"));
        assert!(user.password.is_none());

        let accounts = list_linked_accounts(&user_id).await.expect("accounts");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].provider_account_id, format!("pid-{suffix}"));
    }

    #[tokio::test]
    #[serial]
    async fn test_known_account_signs_in_same_user() {
        init_test_environment().await;
        let suffix = unique("known");
        let email = format!("{suffix}@x.com");

        let first = resolve_account_user(new_account(&suffix, Some(email.clone())))
            .await
            .expect("first sign-in");

        let mut again = new_account(&suffix, Some(email));
        again.name = Some("Gina Renamed".to_string());
        let second = resolve_account_user(again).await.expect("second sign-in");

        assert_eq!(first, second);
        let accounts = list_linked_accounts(&first).await.expect("accounts");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name.as_deref(), Some("Gina Renamed"));
    }

    #[tokio::test]
    #[serial]
    async fn test_existing_email_is_not_linked() {
        init_test_environment().await;
        let suffix = unique("taken");
        let email = format!("{suffix}@x.com");
        UserStore::upsert_user(User::new(
            format!("pw-{suffix}"),
            None,
            Some(email.clone()),
        ))
        .await
        .expect("seed user");

        let result = resolve_account_user(new_account(&suffix, Some(email))).await;

        assert!(matches!(result, Err(CoordinationError::AccountNotLinked(_))));
        let stored = OAuth2Store::get_account_by_provider("google", &format!("pid-{suffix}"))
            .await
            .expect("lookup");
        assert!(stored.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_account_without_email_creates_user() {
        init_test_environment().await;
        let suffix = unique("noemail");

        let user_id = resolve_account_user(new_account(&suffix, None))
            .await
            .expect("resolve");

        let user = UserStore::get_user(&user_id)
            .await
            .expect("lookup")
            .expect("user created");
        assert!(user.email.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_unknown_provider_is_rejected() {
        init_test_environment().await;

        let result = oauth2_signin_core("github", &HeaderMap::new()).await;
        assert!(matches!(result, Err(CoordinationError::UnknownProvider(_))));

        let result = oauth2_signin_core("credentials", &HeaderMap::new()).await;
        assert!(matches!(result, Err(CoordinationError::UnknownProvider(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_signin_returns_google_auth_url() {
        init_test_environment().await;

        let (auth_url, headers) = oauth2_signin_core("google", &HeaderMap::new())
            .await
            .expect("sign in");

        let google = AUTH_CONFIG.oauth_provider("google").expect("google");
        assert!(auth_url.starts_with(google.auth_url.as_str()));
        assert!(headers.contains_key(http::header::SET_COOKIE));
    }
}
