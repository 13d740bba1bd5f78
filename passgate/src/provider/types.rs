use serde::Serialize;
use std::fmt;

use crate::config::PASSGATE_ROUTE_PREFIX;
use crate::oauth2::{OAUTH2_AUTH_URL, OAUTH2_SCOPE, OAUTH2_TOKEN_URL, OAUTH2_USERINFO_URL};

/// A configured sign-in method.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Federated sign-in through an OAuth2 authorization server
    OAuth(OAuthProvider),
    /// Email and password checked against the user store
    Credentials(CredentialsProvider),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OAuth,
    Credentials,
}

impl Provider {
    pub fn id(&self) -> &str {
        match self {
            Provider::OAuth(p) => &p.id,
            Provider::Credentials(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Provider::OAuth(p) => &p.name,
            Provider::Credentials(p) => &p.name,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OAuth(_) => ProviderKind::OAuth,
            Provider::Credentials(_) => ProviderKind::Credentials,
        }
    }

    /// Public description of the provider, free of secrets.
    pub fn info(&self) -> ProviderInfo {
        let prefix = PASSGATE_ROUTE_PREFIX.as_str();
        let id = self.id();
        ProviderInfo {
            id: id.to_string(),
            name: self.name().to_string(),
            kind: self.kind(),
            signin_url: format!("{prefix}/signin/{id}"),
            callback_url: format!("{prefix}/callback/{id}"),
            fields: match self {
                Provider::Credentials(p) => p.fields.clone(),
                Provider::OAuth(_) => Vec::new(),
            },
        }
    }
}

/// An OAuth2 authorization-code provider.
#[derive(Clone)]
pub struct OAuthProvider {
    pub id: String,
    pub name: String,
    pub client_id: String,
    client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scope: String,
    /// Extra query parameters appended to the authorization request
    pub authorization_params: Vec<(String, String)>,
}

impl OAuthProvider {
    /// Google, with endpoints from `OAUTH2_*_URL` or Google's defaults and no
    /// extra authorization parameters.
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            id: "google".to_string(),
            name: "Google".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: OAUTH2_AUTH_URL.clone(),
            token_url: OAUTH2_TOKEN_URL.clone(),
            userinfo_url: OAUTH2_USERINFO_URL.clone(),
            scope: OAUTH2_SCOPE.clone(),
            authorization_params: Vec::new(),
        }
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthProvider")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("scope", &self.scope)
            .field("authorization_params", &self.authorization_params)
            .finish()
    }
}

/// Email/password provider and the form fields it expects.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialsProvider {
    pub id: String,
    pub name: String,
    pub fields: Vec<CredentialField>,
}

/// One input of the sign-in form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl CredentialsProvider {
    pub fn email_password() -> Self {
        Self {
            id: "credentials".to_string(),
            name: "Credentials".to_string(),
            fields: vec![
                CredentialField {
                    name: "email".to_string(),
                    label: "Email".to_string(),
                    input_type: "email".to_string(),
                    placeholder: Some("example@gmail.com".to_string()),
                },
                CredentialField {
                    name: "password".to_string(),
                    label: "Password".to_string(),
                    input_type: "password".to_string(),
                    placeholder: None,
                },
            ],
        }
    }
}

/// What `GET {prefix}/providers` reports for each provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    pub signin_url: String,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<CredentialField>,
}
