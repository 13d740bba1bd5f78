//! Shared test setup
//!
//! Loads `.env_test` once, starts from a fresh SQLite file and makes sure the
//! user and OAuth2 account tables exist.

use std::sync::Once;

pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        if let Some(db_path) = extract_sqlite_file_path() {
            // Missing file is fine
            let _ = std::fs::remove_file(&db_path);
        }
    });

    ensure_database_initialized().await;
}

async fn ensure_database_initialized() {
    use crate::oauth2::OAuth2Store;
    use crate::userdb::UserStore;

    if let Err(e) = UserStore::init().await {
        eprintln!("Warning: Failed to initialize UserStore: {e}");
    }
    if let Err(e) = OAuth2Store::init().await {
        eprintln!("Warning: Failed to initialize OAuth2Store: {e}");
    }
}

/// File path of a SQLite URL (`sqlite:/tmp/x.db`, `sqlite://x.db`,
/// `sqlite:file:x.db?mode=rwc`), or `None` for other URLs and in-memory databases.
fn extract_sqlite_file_path_from_url(url: &str) -> Option<String> {
    let path = url.strip_prefix("sqlite:")?;
    let path = match path.strip_prefix("file:") {
        Some(file_path) => file_path.split('?').next()?,
        None => path.strip_prefix("//").unwrap_or(path),
    };

    if path.contains(":memory:") {
        return None;
    }
    Some(path.to_string())
}

fn extract_sqlite_file_path() -> Option<String> {
    std::env::var("GENERIC_DATA_STORE_URL")
        .ok()
        .and_then(|url| extract_sqlite_file_path_from_url(&url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sqlite_file_path_from_url() {
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:/tmp/test.db"),
            Some("/tmp/test.db".to_string())
        );
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:./test.db"),
            Some("./test.db".to_string())
        );
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite:file:/tmp/test.db?mode=rwc"),
            Some("/tmp/test.db".to_string())
        );
        assert_eq!(
            extract_sqlite_file_path_from_url("sqlite://test.db"),
            Some("test.db".to_string())
        );
    }

    #[test]
    fn test_non_file_urls_are_skipped() {
        assert_eq!(extract_sqlite_file_path_from_url("sqlite::memory:"), None);
        assert_eq!(
            extract_sqlite_file_path_from_url("postgresql://localhost/db"),
            None
        );
    }
}
