use super::RefreshToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side record of a subject's active session.
///
/// An entry without a refresh token is the explicit "present but empty"
/// state: the subject is logged in but has nothing that can be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshToken>,
    pub created_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(refresh_token: RefreshToken) -> Self {
        Self {
            refresh_token: Some(refresh_token),
            created_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self {
            refresh_token: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.refresh_token.is_none()
    }

    /// Exact comparison against the cookie value the client presented.
    pub fn matches(&self, presented: &str) -> bool {
        !presented.is_empty()
            && self
                .refresh_token
                .as_ref()
                .is_some_and(|stored| stored.0 == presented)
    }
}
