use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::config::{SESSION_MAX_AGE, SESSION_UPDATE_AGE};
use crate::session::errors::SessionError;
use crate::storage::CacheData;
use crate::userdb::User;

/// How long sessions live and how often their expiry slides forward.
///
/// The values are fixed: a session lasts [`SESSION_MAX_AGE`] seconds and is
/// extended at most once every [`SESSION_UPDATE_AGE`] seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionPolicy {
    max_age: u64,
    update_age: u64,
}

impl SessionPolicy {
    pub const fn new() -> Self {
        Self {
            max_age: SESSION_MAX_AGE,
            update_age: SESSION_UPDATE_AGE,
        }
    }

    /// Session lifetime in seconds.
    pub const fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Seconds between expiry extensions.
    pub const fn update_age(&self) -> u64 {
        self.update_age
    }

    pub(crate) fn max_age_duration(&self) -> Duration {
        Duration::seconds(self.max_age as i64)
    }

    pub(crate) fn update_age_duration(&self) -> Duration {
        Duration::seconds(self.update_age as i64)
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// The session object exposed to application code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Persistent user id; set by [`shape_session`](crate::session::shape_session).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl Session {
    /// Unshaped session built from a user record: profile fields only.
    pub(crate) fn from_user(user: &User, expires: DateTime<Utc>) -> Self {
        Self {
            user: SessionUser {
                id: None,
                name: user.name.clone(),
                email: user.email.clone(),
                image: user.image.clone(),
            },
            expires,
        }
    }
}

/// Opaque session token carried in the session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct StoredSession {
    pub(super) user_id: String,
    pub(super) expires_at: DateTime<Utc>,
    pub(super) ttl: u64,
}

impl StoredSession {
    pub(super) fn new(user_id: &str, policy: &SessionPolicy, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            expires_at: now + policy.max_age_duration(),
            ttl: policy.max_age(),
        }
    }

    pub(super) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True once `update_age` has passed since the expiry was last set.
    pub(super) fn is_due_for_update(&self, policy: &SessionPolicy, now: DateTime<Utc>) -> bool {
        let last_updated = self.expires_at - policy.max_age_duration();
        now >= last_updated + policy.update_age_duration()
    }

    pub(super) fn extended(self, policy: &SessionPolicy, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: now + policy.max_age_duration(),
            ttl: policy.max_age(),
            ..self
        }
    }
}

impl TryFrom<StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(data: StoredSession) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(&data).map_err(|e| SessionError::Storage(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
