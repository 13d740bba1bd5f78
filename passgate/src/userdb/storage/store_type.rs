use crate::storage::GENERIC_DATA_STORE;
use crate::userdb::{
    errors::UserError,
    types::{User, UserSearchField},
};

use super::postgres::*;
use super::sqlite::*;

/// Persistence adapter for [`User`] records.
///
/// Backed by whichever relational store `GENERIC_DATA_STORE_TYPE` selects.
pub struct UserStore;

impl UserStore {
    /// Create the users table if needed and validate its schema.
    pub async fn init() -> Result<(), UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_user_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_user_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Get a user by their ID
    #[tracing::instrument(fields(user_id = %id))]
    pub async fn get_user(id: &str) -> Result<Option<User>, UserError> {
        Self::get_user_by(UserSearchField::Id(id.to_string())).await
    }

    #[tracing::instrument(fields(user_field = %field))]
    pub async fn get_user_by(field: UserSearchField) -> Result<Option<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            get_user_by_field_sqlite(pool, &field).await
        } else if let Some(pool) = store.as_postgres() {
            get_user_by_field_postgres(pool, &field).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => tracing::debug!(found = true, "User lookup completed"),
            Ok(None) => tracing::debug!(found = false, "User lookup completed - not found"),
            Err(e) => tracing::error!(error = %e, "User lookup failed"),
        }

        result
    }

    /// Create or update a user. `created_at` is kept from the first insert.
    #[tracing::instrument(skip(user), fields(user_id = %user.id))]
    pub async fn upsert_user(user: User) -> Result<User, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            upsert_user_sqlite(pool, user).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_user_postgres(pool, user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => tracing::info!(user_id = %user.id, "User upsert completed"),
            Err(e) => tracing::error!(error = %e, "User upsert failed"),
        }

        result
    }

    #[tracing::instrument]
    pub async fn delete_user(id: &str) -> Result<(), UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_user_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            delete_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use chrono::Utc;
    use serial_test::serial;

    /// Helper function to create a test user with unique timestamp-based ID
    fn create_test_user(suffix: &str) -> User {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        User::new(
            format!("test-user-{suffix}-{timestamp}"),
            Some(format!("Test User {suffix}")),
            Some(format!("user-{suffix}-{timestamp}@example.com")),
        )
    }

    /// Initialization must be idempotent.
    #[tokio::test]
    #[serial]
    async fn test_userstore_init() {
        init_test_environment().await;

        assert!(UserStore::init().await.is_ok());
        assert!(UserStore::init().await.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_upsert_then_get_by_id_and_email() {
        init_test_environment().await;

        let user = create_test_user("lookup").with_password_hash("$2b$04$abc".to_string());
        let stored = UserStore::upsert_user(user.clone())
            .await
            .expect("User creation should succeed");
        assert_eq!(stored.id, user.id);
        assert_eq!(stored.password, user.password);

        let by_id = UserStore::get_user(&user.id)
            .await
            .expect("lookup by id")
            .expect("user exists");
        assert_eq!(by_id.email, user.email);

        let email = user.email.clone().expect("email set");
        let by_email = UserStore::get_user_by(UserSearchField::Email(email))
            .await
            .expect("lookup by email")
            .expect("user exists");
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    #[serial]
    async fn test_upsert_updates_existing_user() {
        init_test_environment().await;

        let user = create_test_user("update");
        let created = UserStore::upsert_user(user.clone()).await.expect("create");

        let mut changed = created.clone();
        changed.name = Some("Renamed".to_string());
        changed.image = Some("https://example.com/a.png".to_string());
        let updated = UserStore::upsert_user(changed).await.expect("update");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name.as_deref(), Some("Renamed"));
        assert_eq!(updated.image.as_deref(), Some("https://example.com/a.png"));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    #[serial]
    async fn test_duplicate_email_is_rejected() {
        init_test_environment().await;

        let first = create_test_user("dup");
        UserStore::upsert_user(first.clone()).await.expect("create");

        let mut second = create_test_user("dup-other");
        second.email = first.email.clone();
        let result = UserStore::upsert_user(second).await;

        assert!(matches!(result, Err(UserError::Storage(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_get_missing_user_returns_none() {
        init_test_environment().await;

        let result = UserStore::get_user("nonexistent_user_id").await;
        assert!(result.expect("lookup should succeed").is_none());

        let result =
            UserStore::get_user_by(UserSearchField::Email("nobody@example.com".to_string())).await;
        assert!(result.expect("lookup should succeed").is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_delete_user() {
        init_test_environment().await;

        let user = create_test_user("delete");
        UserStore::upsert_user(user.clone()).await.expect("create");

        UserStore::delete_user(&user.id).await.expect("delete");

        assert!(UserStore::get_user(&user.id).await.expect("lookup").is_none());
    }
}
