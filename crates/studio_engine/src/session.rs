use std::fmt;

use uuid::Uuid;

/// HTTP header carrying the session token on registry and upload calls.
pub const SESSION_HEADER: &str = "session_id";

/// Opaque per-process identifier the backend scopes documents by.
///
/// Random, not secret, never refreshed and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
