use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const GUEST_SCOPE: &str = "guest";

/// Opaque user identifier that partitions all stored data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserScope(String);

impl UserScope {
    /// Builds a scope from `id`, using the guest scope for blank input.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self::guest()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn guest() -> Self {
        Self(GUEST_SCOPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_SCOPE
    }
}

impl Default for UserScope {
    fn default() -> Self {
        Self::guest()
    }
}

impl fmt::Display for UserScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry of the user registry. Only `id` is interpreted; the rest is carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }

    pub fn scope(&self) -> UserScope {
        UserScope::new(self.id.clone())
    }
}
