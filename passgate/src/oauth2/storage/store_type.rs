use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::OAuth2Account;
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::*;
use super::sqlite::*;

/// Persistence for provider accounts linked to users.
pub(crate) struct OAuth2Store;

impl OAuth2Store {
    pub(crate) async fn init() -> Result<(), OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_oauth2_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_oauth2_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            )),
        }
    }

    /// Get the account a provider knows as `provider_account_id`
    pub(crate) async fn get_account_by_provider(
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<OAuth2Account>, OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_account_by_provider_sqlite(pool, provider, provider_account_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_account_by_provider_postgres(pool, provider, provider_account_id).await
        } else {
            Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    pub(crate) async fn get_accounts_by_user_id(
        user_id: &str,
    ) -> Result<Vec<OAuth2Account>, OAuth2Error> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_accounts_by_user_id_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_accounts_by_user_id_postgres(pool, user_id).await
        } else {
            Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    /// Create or refresh a linked account.
    ///
    /// `user_id` must be set. An empty `id` gets a fresh UUID; on conflict
    /// the stored row keeps its id and only the profile fields change.
    #[tracing::instrument(skip(account), fields(provider = %account.provider))]
    pub(crate) async fn upsert_account(
        mut account: OAuth2Account,
    ) -> Result<OAuth2Account, OAuth2Error> {
        if account.user_id.is_empty() {
            return Err(OAuth2Error::Storage(
                "user_id must be set before upserting OAuth2 account".to_string(),
            ));
        }

        if account.id.is_empty() {
            account.id = uuid::Uuid::new_v4().to_string();
        }

        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            upsert_account_sqlite(pool, account).await
        } else if let Some(pool) = store.as_postgres() {
            upsert_account_postgres(pool, account).await
        } else {
            Err(OAuth2Error::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }
}
