use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::get,
};

use passgate::{ProviderInfo, Session, list_providers, prepare_logout_response, resolve_session};

use super::config::PASSGATE_REDIRECT_ANON;
use super::error::IntoResponseError;

pub(super) fn router() -> Router {
    Router::new()
        .route("/session", get(session))
        .route("/signout", get(signout).post(signout))
        .route("/providers", get(providers))
}

/// Current session as JSON, `null` when signed out.
async fn session(
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<Option<Session>>), (StatusCode, String)> {
    let resolved = resolve_session(&headers).await.into_response_error()?;

    Ok(match resolved {
        Some(resolved) => (resolved.refreshed.unwrap_or_default(), Json(Some(resolved.session))),
        None => (HeaderMap::new(), Json(None)),
    })
}

async fn signout(headers: HeaderMap) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let response_headers = prepare_logout_response(&headers)
        .await
        .into_response_error()?;
    Ok((response_headers, Redirect::to(PASSGATE_REDIRECT_ANON.as_str())))
}

async fn providers() -> Json<Vec<ProviderInfo>> {
    Json(list_providers())
}
