use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Storage identifier of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a storage-assigned user identifier.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Resolved caller identity handed to the core by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum Identity {
    /// No session is attached to the request.
    #[default]
    Anonymous,
    /// Session belongs to an authenticated principal.
    User(UserId),
}

impl Identity {
    /// Creates an authenticated identity.
    #[must_use]
    pub fn user(user_id: UserId) -> Self {
        Self::User(user_id)
    }

    /// Returns the authenticated user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(user_id) => Some(*user_id),
        }
    }

    /// Returns whether no principal is attached.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl Display for Identity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => formatter.write_str("anonymous"),
            Self::User(user_id) => write!(formatter, "user:{user_id}"),
        }
    }
}
