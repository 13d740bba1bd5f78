use http::HeaderMap;

use crate::config::AUTH_CONFIG;
use crate::credentials::{Credentials, Identity, authorize};
use crate::session::create_session_with_uid;

use super::errors::CoordinationError;

/// Sign in with email and password.
///
/// Returns the `Set-Cookie` headers for the new session and the signed-in
/// identity.
#[tracing::instrument(skip_all)]
pub async fn credentials_signin_core(
    credentials: Option<Credentials>,
) -> Result<(HeaderMap, Identity), CoordinationError> {
    if AUTH_CONFIG.credentials_provider().is_none() {
        return Err(CoordinationError::UnknownProvider("credentials".to_string()).log());
    }

    let identity = authorize(credentials)
        .await?
        .ok_or_else(|| CoordinationError::MissingCredentials.log())?;

    let headers = create_session_with_uid(&identity.id, &AUTH_CONFIG.session).await?;

    tracing::info!(user_id = %identity.id, "Signed in with credentials");
    Ok((headers, identity))
}
