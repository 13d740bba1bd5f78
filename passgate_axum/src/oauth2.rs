use axum::{
    Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::get,
};
use axum_extra::{TypedHeader, headers};

use passgate::{AuthResponse, oauth2_callback_core, oauth2_signin_core};

use super::config::PASSGATE_REDIRECT_USER;
use super::error::IntoResponseError;

pub(super) fn router() -> Router {
    Router::new()
        .route("/signin/{provider}", get(signin))
        .route("/callback/{provider}", get(callback))
}

async fn signin(
    Path(provider): Path<String>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let (auth_url, response_headers) = oauth2_signin_core(&provider, &headers)
        .await
        .into_response_error()?;
    Ok((response_headers, Redirect::to(&auth_url)))
}

async fn callback(
    Path(provider): Path<String>,
    Query(auth_response): Query<AuthResponse>,
    TypedHeader(cookies): TypedHeader<headers::Cookie>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let (response_headers, user_id) =
        oauth2_callback_core(&provider, &auth_response, &cookies, &headers)
            .await
            .into_response_error()?;
    tracing::debug!(user_id = %user_id, "OAuth2 callback complete");
    Ok((response_headers, Redirect::to(PASSGATE_REDIRECT_USER.as_str())))
}
