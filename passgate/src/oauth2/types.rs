use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::errors::OAuth2Error;

use crate::storage::CacheData;

/// A provider account linked to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct OAuth2Account {
    pub id: String,
    pub user_id: String,
    pub provider: String,
    pub provider_account_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuth2Account {
    /// Unsaved account for `provider`; `id` and `user_id` are set when linking.
    pub(crate) fn from_userinfo(provider: &str, info: ProviderUserInfo) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: String::new(),
            provider: provider.to_string(),
            provider_account_id: info.id,
            name: info.name,
            email: info.email,
            picture: info.picture,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile returned by the provider's userinfo endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct ProviderUserInfo {
    #[serde(alias = "sub")]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) picture: Option<String>,
    #[serde(default, alias = "email_verified")]
    pub(crate) verified_email: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub(crate) struct StateParams {
    pub(crate) csrf_id: String,
    pub(crate) pkce_id: String,
    pub(crate) provider: String,
}

#[derive(Serialize, Clone, Deserialize, Debug)]
pub(crate) struct StoredToken {
    pub(crate) token: String,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) user_agent: Option<String>,
    pub(crate) ttl: u64,
}

/// Query parameters of the provider's redirect back to the callback route
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub(super) access_token: String,
    #[serde(default)]
    pub(super) token_type: Option<String>,
    #[serde(default)]
    pub(super) expires_in: Option<u64>,
}

impl TryFrom<StoredToken> for CacheData {
    type Error = OAuth2Error;

    fn try_from(data: StoredToken) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(&data).map_err(|e| OAuth2Error::Serde(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for StoredToken {
    type Error = OAuth2Error;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| OAuth2Error::Storage(e.to_string()))
    }
}
