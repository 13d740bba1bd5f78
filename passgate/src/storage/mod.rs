mod cache_store;
mod data_store;
mod errors;
mod schema_validation;
mod types;

pub(crate) use cache_store::GENERIC_CACHE_STORE;
pub(crate) use data_store::{DB_TABLE_PREFIX, GENERIC_DATA_STORE};
pub(crate) use errors::StorageError;
pub(crate) use schema_validation::{validate_postgres_table_schema, validate_sqlite_table_schema};
pub(crate) use types::CacheData;

/// Connect both stores so that misconfiguration surfaces at startup.
pub(crate) async fn init() -> Result<(), StorageError> {
    let _ = *cache_store::GENERIC_CACHE_STORE;
    let _ = *data_store::GENERIC_DATA_STORE;

    Ok(())
}
