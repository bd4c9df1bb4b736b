use std::fmt;

use sqlx::FromRow;

/// A registered account as held by the credential store.
///
/// `username` is unique and case-sensitive. `password_hash` is a bcrypt digest
/// and is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct UserIdentity {
    /// Store-assigned key; `None` until the identity has been saved.
    pub id: Option<i64>,
    pub username: String,
    pub password_hash: String,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}
