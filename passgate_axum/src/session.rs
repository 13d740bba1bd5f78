use std::ops::Deref;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Redirect, Response},
};
use http::{Method, StatusCode, request::Parts};

use super::config::PASSGATE_REDIRECT_ANON;
use passgate::{Session, get_server_auth_session};

/// Rejection for [`AuthSession`]: page requests are redirected, everything else gets 401.
pub struct AuthRedirect {
    method: Method,
}

impl AuthRedirect {
    fn new(method: Method) -> Self {
        Self { method }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        if self.method == Method::GET {
            tracing::debug!("Redirecting to {}", PASSGATE_REDIRECT_ANON.as_str());
            Redirect::temporary(PASSGATE_REDIRECT_ANON.as_str()).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// The signed-in session, available as an Axum extractor
///
/// Uses the session placed in request extensions by
/// [`refresh_session`](crate::refresh_session) when that middleware runs,
/// and otherwise looks the session cookie up itself. Use
/// `Option<AuthSession>` for handlers that also serve anonymous requests.
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use passgate_axum::AuthSession;
///
/// async fn protected(session: AuthSession) -> String {
///     format!("Hello, {}!", session.user.name.as_deref().unwrap_or("there"))
/// }
///
/// let app: Router = Router::new().route("/protected", get(protected));
/// ```
#[derive(Clone, Debug)]
pub struct AuthSession(pub Session);

impl Deref for AuthSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AuthSession> for Session {
    fn from(auth_session: AuthSession) -> Self {
        auth_session.0
    }
}

async fn session_from_parts(parts: &Parts) -> Option<Session> {
    if let Some(session) = parts.extensions.get::<Session>() {
        return Some(session.clone());
    }

    match get_server_auth_session(&parts.headers).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to load session: {}", e);
            None
        }
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        session_from_parts(parts)
            .await
            .map(AuthSession)
            .ok_or_else(|| AuthRedirect::new(parts.method.clone()))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(session_from_parts(parts).await.map(AuthSession))
    }
}
