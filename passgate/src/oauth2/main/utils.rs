use chrono::{DateTime, Utc};
use std::sync::LazyLock;
use std::time::Duration;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{StateParams, StoredToken};
use crate::storage::{CacheData, GENERIC_CACHE_STORE};
use crate::utils::{base64url_decode, base64url_encode, gen_random_string};

pub(super) fn encode_state(state_params: &StateParams) -> Result<String, OAuth2Error> {
    let state_json =
        serde_json::to_string(state_params).map_err(|e| OAuth2Error::Serde(e.to_string()))?;
    Ok(base64url_encode(state_json))
}

pub(super) fn decode_state(state: &str) -> Result<StateParams, OAuth2Error> {
    let decoded_bytes = base64url_decode(state)
        .map_err(|e| OAuth2Error::DecodeState(format!("Failed to decode base64: {e}")))?;
    let decoded_state_string = String::from_utf8(decoded_bytes)
        .map_err(|e| OAuth2Error::DecodeState(format!("Failed to decode UTF-8: {e}")))?;
    serde_json::from_str(&decoded_state_string)
        .map_err(|e| OAuth2Error::DecodeState(format!("Failed to parse state: {e}")))
}

/// Generate a random token, store it under `token_type` and return `(token, token_id)`.
pub(super) async fn generate_store_token(
    token_type: &str,
    ttl: u64,
    expires_at: DateTime<Utc>,
    user_agent: Option<String>,
) -> Result<(String, String), OAuth2Error> {
    let token = gen_random_string(32)?;
    let token_id = gen_random_string(32)?;

    let stored_token = StoredToken {
        token: token.clone(),
        expires_at,
        user_agent,
        ttl,
    };
    let data: CacheData = stored_token.try_into()?;

    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(token_type, &token_id, data, ttl as usize)
        .await
        .map_err(|e| OAuth2Error::Storage(e.to_string()))?;

    Ok((token, token_id))
}

pub(super) async fn get_token_from_store(
    token_type: &str,
    token_id: &str,
) -> Result<StoredToken, OAuth2Error> {
    GENERIC_CACHE_STORE
        .lock()
        .await
        .get(token_type, token_id)
        .await
        .map_err(|e| OAuth2Error::Storage(e.to_string()))?
        .ok_or_else(|| {
            OAuth2Error::SecurityTokenNotFound(format!("{token_type}-session not found"))
        })?
        .try_into()
}

pub(super) async fn remove_token_from_store(
    token_type: &str,
    token_id: &str,
) -> Result<(), OAuth2Error> {
    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(token_type, token_id)
        .await
        .map_err(|e| OAuth2Error::Storage(e.to_string()))
}

/// Process-wide HTTP client for provider calls: 30s request timeout, pooled
/// connections.
static HTTP_CLIENT: LazyLock<Result<reqwest::Client, String>> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| e.to_string())
});

/// Handle to the shared client; clones share one connection pool.
pub(super) fn get_client() -> Result<reqwest::Client, OAuth2Error> {
    HTTP_CLIENT
        .as_ref()
        .cloned()
        .map_err(|e| OAuth2Error::Config(format!("Failed to create HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use serial_test::serial;

    #[test]
    fn test_encode_decode_state() {
        let state_params = StateParams {
            csrf_id: "csrf123".to_string(),
            pkce_id: "pkce789".to_string(),
            provider: "google".to_string(),
        };

        let encoded = encode_state(&state_params).expect("encode");

        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));

        let decoded = decode_state(&encoded).expect("decode");
        assert_eq!(decoded, state_params);
    }

    #[test]
    fn test_decode_state_invalid_base64() {
        let result = decode_state("this is not base64!!!");
        assert!(matches!(result, Err(OAuth2Error::DecodeState(_))));
    }

    #[test]
    fn test_decode_state_invalid_json() {
        let encoded = base64url_encode(b"{\"csrf_id\": 1}");
        let result = decode_state(&encoded);
        assert!(matches!(result, Err(OAuth2Error::DecodeState(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_get_remove_token() {
        init_test_environment().await;

        let expires_at = Utc::now() + chrono::Duration::seconds(60);
        let (token, token_id) =
            generate_store_token("csrf", 60, expires_at, Some("agent".to_string()))
                .await
                .expect("store token");
        assert_ne!(token, token_id);

        let stored = get_token_from_store("csrf", &token_id)
            .await
            .expect("token exists");
        assert_eq!(stored.token, token);
        assert_eq!(stored.user_agent.as_deref(), Some("agent"));

        remove_token_from_store("csrf", &token_id)
            .await
            .expect("remove");
        let result = get_token_from_store("csrf", &token_id).await;
        assert!(matches!(result, Err(OAuth2Error::SecurityTokenNotFound(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_token_types_do_not_collide() {
        init_test_environment().await;

        let expires_at = Utc::now() + chrono::Duration::seconds(60);
        let (_, pkce_id) = generate_store_token("pkce", 60, expires_at, None)
            .await
            .expect("store token");

        let result = get_token_from_store("csrf", &pkce_id).await;
        assert!(matches!(result, Err(OAuth2Error::SecurityTokenNotFound(_))));
    }

    #[test]
    fn test_get_client_builds() {
        assert!(get_client().is_ok());
    }

    #[test]
    fn test_get_client_reuses_shared_client() {
        for _ in 0..3 {
            assert!(get_client().is_ok());
        }

        let first: *const _ = &*HTTP_CLIENT;
        let second: *const _ = &*HTTP_CLIENT;
        assert!(std::ptr::eq(first, second));
        assert!(HTTP_CLIENT.is_ok());
    }
}
