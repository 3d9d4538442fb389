use crate::domain_model::RefreshToken;
use std::fmt::Write;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// Attributes of the refresh-token cookie. It is always `HttpOnly`.
#[derive(Debug, Clone, Default)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age_secs: Option<u64>,
}

impl CookiePolicy {
    pub fn set_refresh_token(&self, token: &RefreshToken) -> String {
        let mut cookie = format!("{}={}; HttpOnly; Path=/; SameSite=Lax", REFRESH_COOKIE, token.0);
        if let Some(max_age) = self.max_age_secs {
            let _ = write!(cookie, "; Max-Age={}", max_age);
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn clear_refresh_token(&self) -> String {
        let mut cookie = format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", REFRESH_COOKIE);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_by_default() {
        let cookie = CookiePolicy::default().set_refresh_token(&RefreshToken("RT1".into()));
        assert_eq!(cookie, "refreshToken=RT1; HttpOnly; Path=/; SameSite=Lax");
    }

    #[test]
    fn max_age_and_secure_are_appended() {
        let policy = CookiePolicy {
            secure: true,
            max_age_secs: Some(60),
        };
        let cookie = policy.set_refresh_token(&RefreshToken("RT1".into()));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Max-Age=60; Secure"));
    }

    #[test]
    fn clearing_expires_immediately() {
        let cookie = CookiePolicy::default().clear_refresh_token();
        assert!(cookie.starts_with("refreshToken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
