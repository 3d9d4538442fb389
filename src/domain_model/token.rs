use super::SubjectId;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

impl RefreshToken {
    /// True when the value can be written into `Set-Cookie` verbatim
    /// (RFC 6265 `cookie-octet`s only).
    pub fn is_cookie_safe(&self) -> bool {
        self.0
            .bytes()
            .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
    }
}

/// Claims extracted from an access token. Nothing here has been
/// signature-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: SubjectId,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Claims {
    /// A token without an `exp` claim is never considered live.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => false,
        }
    }
}

/// What the identity provider hands back from any token exchange.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub expires_in: u64,
}

impl TokenGrant {
    /// `None` when `expires_in` does not fit a representable instant.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(i64::try_from(self.expires_in).ok()?)?;
        now.checked_add_signed(lifetime)
    }
}
