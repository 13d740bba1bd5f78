use axum::{
    Form, Router,
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::post,
};
use serde::Deserialize;

use passgate::{Credentials, credentials_signin_core};

use super::config::PASSGATE_REDIRECT_USER;
use super::error::IntoResponseError;

pub(super) fn router() -> Router {
    Router::new().route("/callback/credentials", post(callback))
}

/// Sign-in form body; absent fields mean "no credentials submitted".
#[derive(Deserialize)]
struct CredentialsForm {
    email: Option<String>,
    password: Option<String>,
}

impl CredentialsForm {
    fn into_credentials(self) -> Option<Credentials> {
        match (self.email, self.password) {
            (Some(email), Some(password)) => Some(Credentials::new(email, password)),
            _ => None,
        }
    }
}

async fn callback(
    Form(form): Form<CredentialsForm>,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let (response_headers, _identity) = credentials_signin_core(form.into_credentials())
        .await
        .into_response_error()?;
    Ok((response_headers, Redirect::to(PASSGATE_REDIRECT_USER.as_str())))
}
