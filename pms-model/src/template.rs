use serde::{Deserialize, Serialize};

/// A reusable message skeleton, persisted on the client only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub project: Option<u64>,
}

impl Template {
    pub fn new(title: impl Into<String>, body: impl Into<String>, project: Option<u64>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            project,
        }
    }
}

/// Persisted session token, stored as `{"token": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Value of the `Authorization` header for this token.
    pub fn header_value(&self) -> String {
        format!("token {}", self.token)
    }
}
