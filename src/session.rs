//! Client-generated session identity.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

const SUFFIX_LEN: usize = 9;

/// Opaque correlation id sent with every chat request.
///
/// Created once per client and never changed. The server only compares it
/// for equality to associate turns with one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id of the form `session_<unix millis>_<random suffix>`.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("session_{}_{}", millis, &random[..SUFFIX_LEN]))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
