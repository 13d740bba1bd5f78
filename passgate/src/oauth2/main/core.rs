use headers::Cookie;
use http::header::HeaderMap;

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use url::Url;

use crate::oauth2::config::{OAUTH2_CSRF_COOKIE_MAX_AGE, OAUTH2_CSRF_COOKIE_NAME, redirect_uri};
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{AuthResponse, ProviderUserInfo, StateParams};
use crate::provider::OAuthProvider;
use crate::utils::{base64url_encode, header_set_cookie};

use super::google::{exchange_code_for_token, fetch_user_data};
use super::utils::{
    decode_state, encode_state, generate_store_token, get_token_from_store,
    remove_token_from_store,
};

const CSRF_TOKEN_TYPE: &str = "csrf";
const PKCE_TOKEN_TYPE: &str = "pkce";

/// Build the provider's authorization URL and the `Set-Cookie` headers
/// carrying the CSRF token for the round trip.
#[tracing::instrument(skip_all, fields(provider = %provider.id))]
pub(crate) async fn prepare_oauth2_auth_request(
    provider: &OAuthProvider,
    headers: &HeaderMap,
) -> Result<(String, HeaderMap), OAuth2Error> {
    let ttl = *OAUTH2_CSRF_COOKIE_MAX_AGE;
    let expires_at = Utc::now() + Duration::seconds(ttl as i64);
    let user_agent = user_agent(headers);

    let (csrf_token, csrf_id) =
        generate_store_token(CSRF_TOKEN_TYPE, ttl, expires_at, Some(user_agent)).await?;
    let (pkce_token, pkce_id) = generate_store_token(PKCE_TOKEN_TYPE, ttl, expires_at, None).await?;

    let pkce_challenge = base64url_encode(Sha256::digest(pkce_token.as_bytes()));

    let encoded_state = encode_state(&StateParams {
        csrf_id,
        pkce_id,
        provider: provider.id.clone(),
    })?;

    let redirect_uri = redirect_uri(&provider.id)?;
    let mut params: Vec<(&str, &str)> = vec![
        ("response_type", "code"),
        ("client_id", provider.client_id.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("scope", provider.scope.as_str()),
        ("state", encoded_state.as_str()),
        ("code_challenge", pkce_challenge.as_str()),
        ("code_challenge_method", "S256"),
    ];
    params.extend(
        provider
            .authorization_params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );

    let auth_url = Url::parse_with_params(&provider.auth_url, &params)
        .map_err(|e| OAuth2Error::AuthUrl(e.to_string()))?;

    tracing::debug!("Auth URL: {}", auth_url);

    // The provider redirects back with a top-level GET, which SameSite=Lax allows.
    let mut headers = HeaderMap::new();
    header_set_cookie(
        &mut headers,
        OAUTH2_CSRF_COOKIE_NAME.as_str(),
        &csrf_token,
        ttl as i64,
    )?;

    Ok((auth_url.into(), headers))
}

/// Validate the callback against the CSRF cookie and the state issued by
/// [`prepare_oauth2_auth_request`]. The CSRF token is single use.
#[tracing::instrument(skip_all, fields(provider = %provider_id))]
pub(crate) async fn csrf_checks(
    provider_id: &str,
    cookies: &Cookie,
    auth_response: &AuthResponse,
    headers: &HeaderMap,
) -> Result<StateParams, OAuth2Error> {
    let csrf_token = cookies
        .get(OAUTH2_CSRF_COOKIE_NAME.as_str())
        .ok_or_else(|| {
            OAuth2Error::SecurityTokenNotFound("No CSRF session cookie found".to_string())
        })?;

    let state_in_response = decode_state(&auth_response.state)?;

    if state_in_response.provider != provider_id {
        return Err(OAuth2Error::ProviderMismatch {
            expected: state_in_response.provider,
            actual: provider_id.to_string(),
        });
    }

    let csrf_id = &state_in_response.csrf_id;
    let csrf_session = get_token_from_store(CSRF_TOKEN_TYPE, csrf_id).await?;
    remove_token_from_store(CSRF_TOKEN_TYPE, csrf_id).await?;

    if !bool::from(csrf_token.as_bytes().ct_eq(csrf_session.token.as_bytes())) {
        tracing::error!("CSRF token in cookie does not match stored token");
        return Err(OAuth2Error::CsrfTokenMismatch);
    }

    if Utc::now() > csrf_session.expires_at {
        tracing::error!("CSRF token expired at {}", csrf_session.expires_at);
        return Err(OAuth2Error::CsrfTokenExpired);
    }

    let user_agent = user_agent(headers);
    if csrf_session.user_agent.as_deref() != Some(user_agent.as_str()) {
        tracing::error!(
            user_agent = %user_agent,
            stored_user_agent = ?csrf_session.user_agent,
            "User agent mismatch"
        );
        return Err(OAuth2Error::UserAgentMismatch);
    }

    Ok(state_in_response)
}

/// Redeem the authorization code with the stored PKCE verifier and fetch
/// the signed-in account's profile.
#[tracing::instrument(skip_all, fields(provider = %provider.id))]
pub(crate) async fn fetch_user_info(
    provider: &OAuthProvider,
    auth_response: &AuthResponse,
    state: &StateParams,
) -> Result<ProviderUserInfo, OAuth2Error> {
    let pkce_session = get_token_from_store(PKCE_TOKEN_TYPE, &state.pkce_id).await?;
    remove_token_from_store(PKCE_TOKEN_TYPE, &state.pkce_id).await?;

    let access_token =
        exchange_code_for_token(provider, &auth_response.code, &pkce_session.token).await?;

    fetch_user_data(provider, &access_token).await
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("Unknown")
        .to_string()
}
