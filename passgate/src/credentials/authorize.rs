use async_trait::async_trait;
use std::sync::LazyLock;

use crate::userdb::{User, UserError, UserSearchField, UserStore};

use super::errors::CredentialError;
use super::password::verify_password;
use super::types::{Credentials, Identity};

/// Hash compared against when no user matches the email, so that unknown
/// accounts cost the same bcrypt work as known ones.
static TIMING_EQUALIZER_HASH: LazyLock<String> = LazyLock::new(|| {
    bcrypt::hash(TIMING_EQUALIZER_PASSWORD, bcrypt::DEFAULT_COST).unwrap_or_default()
});

const TIMING_EQUALIZER_PASSWORD: &str = "passgate-timing-equalizer";

/// Where [`authorize_with`] finds users.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}

#[async_trait]
impl UserLookup for UserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        UserStore::get_user_by(UserSearchField::Email(email.to_string())).await
    }
}

/// Verify submitted credentials against the user store.
///
/// Returns `Ok(None)` without touching the store when no credentials were
/// submitted, `Ok(Some(identity))` when the email exists and the password
/// matches its stored hash, and [`CredentialError::InvalidCredentials`]
/// otherwise.
pub async fn authorize(
    credentials: Option<Credentials>,
) -> Result<Option<Identity>, CredentialError> {
    authorize_with(&UserStore, credentials).await
}

/// [`authorize`] against an arbitrary [`UserLookup`].
#[tracing::instrument(skip_all)]
pub async fn authorize_with<L>(
    lookup: &L,
    credentials: Option<Credentials>,
) -> Result<Option<Identity>, CredentialError>
where
    L: UserLookup + ?Sized,
{
    let Some(Credentials { email, password }) = credentials else {
        tracing::debug!("No credentials submitted");
        return Ok(None);
    };

    let user = lookup.find_by_email(&email).await?;

    // A user without a password (OAuth-only) compares against the empty hash,
    // which never matches.
    let stored_hash = user
        .as_ref()
        .map(|user| user.password.clone().unwrap_or_default());

    let verified = tokio::task::spawn_blocking(move || {
        let hash = stored_hash.unwrap_or_else(|| TIMING_EQUALIZER_HASH.clone());
        verify_password(&password, &hash)
    })
    .await
    .map_err(|e| CredentialError::Hash(e.to_string()))?;

    // An unreadable stored hash rejects like a wrong password
    let matches = match verified {
        Ok(matches) => matches,
        Err(CredentialError::Hash(e)) => {
            tracing::warn!("Unreadable password hash: {}", e);
            false
        }
        Err(e) => return Err(e),
    };

    match user {
        Some(user) if matches => {
            tracing::info!(user_id = %user.id, "Credentials accepted");
            Ok(Some(Identity::from(&user)))
        }
        _ => {
            tracing::info!("Credentials rejected");
            Err(CredentialError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use serial_test::serial;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory lookup recording every email it is asked for
    struct MockLookup {
        users: Vec<User>,
        calls: AtomicUsize,
        queried: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockLookup {
        fn new(users: Vec<User>) -> Self {
            Self {
                users,
                calls: AtomicUsize::new(0),
                queried: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(Vec::new())
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserLookup for MockLookup {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queried
                .lock()
                .expect("lock")
                .push(email.to_string());
            if self.fail {
                return Err(UserError::Storage("lookup failed".to_string()));
            }
            Ok(self
                .users
                .iter()
                .find(|u| u.email.as_deref() == Some(email))
                .cloned())
        }
    }

    fn user_with_password(id: &str, email: &str, password: &str) -> User {
        User::new(
            id.to_string(),
            Some("Alice".to_string()),
            Some(email.to_string()),
        )
        .with_password_hash(bcrypt::hash(password, 4).expect("hash"))
    }

    #[tokio::test]
    async fn test_absent_credentials_skip_lookup() {
        let lookup = MockLookup::new(vec![user_with_password("u1", "a@x.com", "secret")]);

        let result = authorize_with(&lookup, None).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_credentials_return_identity() {
        let lookup = MockLookup::new(vec![user_with_password("u1", "a@x.com", "secret")]);

        let identity = authorize_with(&lookup, Some(Credentials::new("a@x.com", "secret")))
            .await
            .expect("authorize")
            .expect("identity");

        assert_eq!(
            identity,
            Identity {
                id: "u1".to_string(),
                name: Some("Alice".to_string()),
                email: Some("a@x.com".to_string()),
            }
        );
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_uses_email_only() {
        let lookup = MockLookup::new(vec![user_with_password("u1", "a@x.com", "secret")]);

        let _ = authorize_with(&lookup, Some(Credentials::new("a@x.com", "secret"))).await;

        let queried = lookup.queried.lock().expect("lock").clone();
        assert_eq!(queried, vec!["a@x.com".to_string()]);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let lookup = MockLookup::new(vec![user_with_password("u1", "a@x.com", "secret")]);

        let result = authorize_with(&lookup, Some(Credentials::new("a@x.com", "wrong"))).await;

        let err = result.expect_err("should be rejected");
        assert!(matches!(err, CredentialError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_unknown_email_is_indistinguishable_from_wrong_password() {
        let lookup = MockLookup::new(vec![user_with_password("u1", "a@x.com", "secret")]);

        let unknown = authorize_with(&lookup, Some(Credentials::new("b@x.com", "secret")))
            .await
            .expect_err("unknown email");
        let wrong = authorize_with(&lookup, Some(Credentials::new("a@x.com", "nope")))
            .await
            .expect_err("wrong password");

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_email_with_equalizer_password_is_rejected() {
        let lookup = MockLookup::new(Vec::new());

        let result = authorize_with(
            &lookup,
            Some(Credentials::new("ghost@x.com", TIMING_EQUALIZER_PASSWORD)),
        )
        .await;

        assert!(matches!(result, Err(CredentialError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_user_without_password_is_always_rejected() {
        let oauth_only = User::new("u2".to_string(), None, Some("g@x.com".to_string()));
        let lookup = MockLookup::new(vec![oauth_only]);

        for attempt in ["", "anything", "secret"] {
            let result = authorize_with(&lookup, Some(Credentials::new("g@x.com", attempt))).await;
            assert!(matches!(result, Err(CredentialError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let lookup = MockLookup::failing();

        let result = authorize_with(&lookup, Some(Credentials::new("a@x.com", "secret"))).await;

        assert!(matches!(
            result,
            Err(CredentialError::User(UserError::Storage(_)))
        ));
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_invalid_credentials() {
        let broken = User::new("u3".to_string(), None, Some("c@x.com".to_string()))
            .with_password_hash("plaintext-not-a-hash".to_string());
        let lookup = MockLookup::new(vec![broken]);

        for attempt in ["secret", "plaintext-not-a-hash"] {
            let err = authorize_with(&lookup, Some(Credentials::new("c@x.com", attempt)))
                .await
                .expect_err("should be rejected");
            assert!(matches!(err, CredentialError::InvalidCredentials));
            assert_eq!(err.to_string(), "Invalid credentials");
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_authorize_against_user_store() {
        init_test_environment().await;

        let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let email = format!("store-{suffix}@x.com");
        let user = user_with_password(&format!("u-{suffix}"), &email, "secret");
        UserStore::upsert_user(user.clone()).await.expect("seed user");

        let identity = authorize(Some(Credentials::new(email.clone(), "secret")))
            .await
            .expect("authorize")
            .expect("identity");
        assert_eq!(identity.id, user.id);

        let rejected = authorize(Some(Credentials::new(email, "wrong"))).await;
        assert!(matches!(rejected, Err(CredentialError::InvalidCredentials)));
    }
}
