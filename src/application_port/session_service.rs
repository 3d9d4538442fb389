use crate::domain_model::*;
use crate::domain_port::{ProviderError, StoreError};
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("upstream auth error: {0}")]
    Upstream(#[from] ProviderError),
    #[error("malformed token")]
    MalformedToken,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub subject: SubjectId,
    pub access_token: AccessToken,
    /// Absent when the grant carried no refresh token; no cookie is set then.
    pub refresh_token: Option<RefreshToken>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

/// Session lifecycle per subject: anonymous, authenticated, logged out.
///
/// Operations that need a caller take the subject derived by the
/// [`SessionValidator`](super::SessionValidator); `None` fails with
/// [`SessionError::Unauthenticated`].
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<LoginResult, SessionError>;
    async fn login_with_code(&self, code: &str) -> Result<LoginResult, SessionError>;
    async fn refresh(
        &self,
        subject: Option<&SubjectId>,
        presented_refresh_token: Option<&str>,
    ) -> Result<RefreshResult, SessionError>;
    async fn logout(&self, subject: Option<&SubjectId>) -> Result<(), SessionError>;
    async fn user_info(&self, subject: Option<&SubjectId>) -> Result<UserProfile, SessionError>;
    async fn register(&self, user: NewUser) -> Result<UserProfile, SessionError>;
    fn login_page_url(&self) -> Option<String>;
}
