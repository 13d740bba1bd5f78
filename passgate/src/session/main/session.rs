use chrono::Utc;
use http::header::HeaderMap;

use crate::config::AUTH_CONFIG;
use crate::session::config::{SESSION_CACHE_PREFIX, SESSION_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::session::types::{Session, SessionPolicy, SessionToken, StoredSession};
use crate::storage::{CacheData, GENERIC_CACHE_STORE};
use crate::userdb::UserStore;
use crate::utils::{gen_random_string, get_cookie_from_headers, header_set_cookie};

use super::shape::shape_session;

/// A session resolved from request headers.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// The shaped session
    pub session: Session,
    /// `Set-Cookie` headers to attach to the response when the expiry slid forward
    pub refreshed: Option<HeaderMap>,
}

/// Start a session for `user_id` and return the `Set-Cookie` headers carrying its token.
#[tracing::instrument(skip(policy))]
pub(crate) async fn create_session_with_uid(
    user_id: &str,
    policy: &SessionPolicy,
) -> Result<HeaderMap, SessionError> {
    let session_id = gen_random_string(32)?;
    let stored_session = StoredSession::new(user_id, policy, Utc::now());

    store_session(&session_id, stored_session, policy).await?;

    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        SESSION_COOKIE_NAME.as_str(),
        &session_id,
        policy.max_age() as i64,
    )?;

    tracing::debug!("Created session");
    Ok(headers)
}

/// Current session for the request, sliding its expiry when due.
///
/// Returns `Ok(None)` when there is no session cookie, the session is unknown
/// or expired, or its user no longer exists.
pub async fn resolve_session(headers: &HeaderMap) -> Result<Option<ResolvedSession>, SessionError> {
    load_session(headers, &AUTH_CONFIG.session, true).await
}

/// Current session for the request, or `None` when signed out.
///
/// Read-only: the session store is not touched beyond the lookup. Use
/// [`resolve_session`] where the response can carry a refreshed cookie.
pub async fn get_server_auth_session(headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
    Ok(load_session(headers, &AUTH_CONFIG.session, false)
        .await?
        .map(|resolved| resolved.session))
}

/// Expire the session cookie and forget the session.
pub async fn prepare_logout_response(headers: &HeaderMap) -> Result<HeaderMap, SessionError> {
    let mut response_headers = HeaderMap::new();
    header_set_cookie(
        &mut response_headers,
        SESSION_COOKIE_NAME.as_str(),
        "value",
        -86400,
    )?;

    if let Some(session_id) = get_session_id_from_headers(headers)? {
        delete_session_from_store(session_id).await?;
        tracing::info!("Session removed");
    }

    Ok(response_headers)
}

pub(super) fn get_session_id_from_headers(
    headers: &HeaderMap,
) -> Result<Option<&str>, SessionError> {
    let session_id = get_cookie_from_headers(headers, SESSION_COOKIE_NAME.as_str())?;
    if session_id.is_none() {
        tracing::debug!("No session cookie '{}' found", SESSION_COOKIE_NAME.as_str());
    }
    Ok(session_id)
}

async fn load_session(
    headers: &HeaderMap,
    policy: &SessionPolicy,
    refresh: bool,
) -> Result<Option<ResolvedSession>, SessionError> {
    let Some(session_id) = get_session_id_from_headers(headers)? else {
        return Ok(None);
    };

    let cached = GENERIC_CACHE_STORE
        .lock()
        .await
        .get(SESSION_CACHE_PREFIX, session_id)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))?;

    let Some(cached) = cached else {
        tracing::debug!("Session not found in store");
        return Ok(None);
    };

    let stored_session: StoredSession = match cached.try_into() {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("Discarding unreadable session: {}", e);
            delete_session_from_store(session_id).await?;
            return Ok(None);
        }
    };

    let now = Utc::now();
    if stored_session.is_expired(now) {
        tracing::debug!("Session expired at {}", stored_session.expires_at);
        delete_session_from_store(session_id).await?;
        return Ok(None);
    }

    let Some(user) = UserStore::get_user(&stored_session.user_id).await? else {
        tracing::info!(user_id = %stored_session.user_id, "Session user no longer exists");
        delete_session_from_store(session_id).await?;
        return Ok(None);
    };

    let (stored_session, refreshed) = if refresh && stored_session.is_due_for_update(policy, now)
    {
        let extended = stored_session.extended(policy, now);
        store_session(session_id, extended.clone(), policy).await?;

        let mut cookie_headers = HeaderMap::new();
        header_set_cookie(
            &mut cookie_headers,
            SESSION_COOKIE_NAME.as_str(),
            session_id,
            policy.max_age() as i64,
        )?;
        tracing::debug!(expires_at = %extended.expires_at, "Session expiry extended");
        (extended, Some(cookie_headers))
    } else {
        (stored_session, None)
    };

    let token = SessionToken::new(session_id);
    let session = shape_session(
        Session::from_user(&user, stored_session.expires_at),
        &token,
        &user,
    );

    Ok(Some(ResolvedSession { session, refreshed }))
}

async fn store_session(
    session_id: &str,
    stored_session: StoredSession,
    policy: &SessionPolicy,
) -> Result<(), SessionError> {
    let data: CacheData = stored_session.try_into()?;
    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            SESSION_CACHE_PREFIX,
            session_id,
            data,
            policy.max_age() as usize,
        )
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))
}

async fn delete_session_from_store(session_id: &str) -> Result<(), SessionError> {
    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(SESSION_CACHE_PREFIX, session_id)
        .await
        .map_err(|e| SessionError::Storage(e.to_string()))
}
