use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;
use http::header::SET_COOKIE;

use super::config::PASSGATE_REDIRECT_ANON;
use passgate::{ResolvedSession, SESSION_COOKIE_NAME, resolve_session};

async fn resolve(headers: &HeaderMap) -> Option<ResolvedSession> {
    match resolve_session(headers).await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!("Failed to resolve session: {}", e);
            None
        }
    }
}

/// True when the handler already issued or expired the session cookie.
fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE_NAME.as_str());
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(prefix.as_str()))
}

fn append_refreshed(mut response: Response, refreshed: Option<HeaderMap>) -> Response {
    if sets_session_cookie(&response) {
        // Sign-in and sign-out own the cookie for this response
        return response;
    }
    if let Some(headers) = refreshed {
        for (name, value) in headers.iter() {
            response.headers_mut().append(name, value.clone());
        }
        tracing::debug!("Session expiry extended");
    }
    response
}

async fn run_with_session(mut req: Request, next: Next, resolved: ResolvedSession) -> Response {
    let ResolvedSession { session, refreshed } = resolved;
    req.extensions_mut().insert(session);
    let response = next.run(req).await;
    append_refreshed(response, refreshed)
}

/// Resolve the session for every request.
///
/// Signed-in requests get the [`Session`](passgate::Session) in request
/// extensions, where [`AuthSession`](crate::AuthSession) picks it up, and a
/// refreshed session cookie on the response when the expiry slid forward.
/// Anonymous requests pass through unchanged.
pub async fn refresh_session(req: Request, next: Next) -> Response {
    match resolve(req.headers()).await {
        Some(resolved) => run_with_session(req, next, resolved).await,
        None => next.run(req).await,
    }
}

// Signed-in only, 401 otherwise
pub async fn is_authenticated_401(req: Request, next: Next) -> Response {
    match resolve(req.headers()).await {
        Some(resolved) => run_with_session(req, next, resolved).await,
        None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}

// Signed-in only, redirect GET requests to the anonymous landing page
pub async fn is_authenticated_redirect(req: Request, next: Next) -> Response {
    match resolve(req.headers()).await {
        Some(resolved) => run_with_session(req, next, resolved).await,
        None if req.method() == http::Method::GET => {
            Redirect::temporary(PASSGATE_REDIRECT_ANON.as_str()).into_response()
        }
        None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}
