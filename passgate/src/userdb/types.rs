use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A persistent user record.
///
/// `password` holds a bcrypt hash and is absent for users that only sign in
/// through an OAuth provider. It is never serialized.
#[derive(Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Unique, stable user identifier
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Email address, unique across users when present
    pub email: Option<String>,
    /// Avatar URL
    pub image: Option<String>,
    /// bcrypt hash of the user's password
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, name: Option<String>, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email,
            image: None,
            password: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a password hash (see `credentials::hash_password`).
    pub fn with_password_hash(mut self, hash: String) -> Self {
        self.password = Some(hash);
        self
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("image", &self.image)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Lookup keys for [`UserStore::get_user_by`](crate::userdb::UserStore::get_user_by)
#[derive(Debug, Clone)]
pub enum UserSearchField {
    Id(String),
    Email(String),
}

impl fmt::Display for UserSearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserSearchField::Id(id) => write!(f, "id={id}"),
            UserSearchField::Email(email) => write!(f, "email={email}"),
        }
    }
}
