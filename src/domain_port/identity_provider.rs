use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("identity provider answered {status}: {message}")]
    UpstreamAuth { status: u16, message: String },
    #[error("identity provider unreachable: {0}")]
    Transport(String),
    #[error("malformed identity provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        ProviderError::UpstreamAuth {
            status,
            message: message.into(),
        }
    }
}

/// Credential exchanger backed by an OAuth2 identity provider.
///
/// Every call is a single request/response. Nothing is retried and no local
/// state is touched.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_password(&self, login: &str, password: &str)
    -> Result<TokenGrant, ProviderError>;
    /// The returned grant never carries a new refresh token.
    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, ProviderError>;
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenGrant, ProviderError>;
    async fn get_user(&self, subject: &SubjectId) -> Result<UserProfile, ProviderError>;
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, ProviderError>;
    /// Hosted login page that starts the authorization-code flow, if any.
    fn login_page_url(&self) -> Option<String>;
}
