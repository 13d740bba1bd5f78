use crate::oauth2::config::redirect_uri;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{ProviderUserInfo, TokenResponse};
use crate::provider::OAuthProvider;

use super::utils::get_client;

pub(super) async fn fetch_user_data(
    provider: &OAuthProvider,
    access_token: &str,
) -> Result<ProviderUserInfo, OAuth2Error> {
    let client = get_client()?;
    let response = client
        .get(provider.userinfo_url.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!(%status, provider = %provider.id, "Userinfo request rejected");
        return Err(OAuth2Error::FetchUserInfo(status.to_string()));
    }

    let response_body = response
        .text()
        .await
        .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

    let user_info: ProviderUserInfo = serde_json::from_str(&response_body)
        .map_err(|e| OAuth2Error::Serde(format!("Failed to deserialize response body: {e}")))?;

    tracing::debug!(
        provider_account_id = %user_info.id,
        verified_email = ?user_info.verified_email,
        "Fetched user info"
    );
    Ok(user_info)
}

pub(super) async fn exchange_code_for_token(
    provider: &OAuthProvider,
    code: &str,
    code_verifier: &str,
) -> Result<String, OAuth2Error> {
    let redirect_uri = redirect_uri(&provider.id)?;
    let client = get_client()?;
    let response = client
        .post(provider.token_url.as_str())
        .form(&[
            ("code", code),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("code_verifier", code_verifier),
        ])
        .send()
        .await
        .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        tracing::error!(%status, provider = %provider.id, "Token exchange rejected");
        return Err(OAuth2Error::TokenExchange(status.to_string()));
    }

    let response_body = response
        .text()
        .await
        .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;
    let token_response: TokenResponse = serde_json::from_str(&response_body)
        .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

    tracing::debug!(
        token_type = ?token_response.token_type,
        expires_in = ?token_response.expires_in,
        "Token exchange completed"
    );

    Ok(token_response.access_token)
}
