use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct RealSessionService {
    identity_provider: Arc<dyn IdentityProvider>,
    session_store: Arc<dyn SessionStore>,
    token_codec: Arc<dyn TokenCodec>,
}

impl RealSessionService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        session_store: Arc<dyn SessionStore>,
        token_codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            identity_provider,
            session_store,
            token_codec,
        }
    }

    /// Persists the grant's refresh token under the subject named by its
    /// access token, replacing whatever session that subject had before.
    async fn establish(&self, grant: TokenGrant) -> Result<LoginResult, SessionError> {
        let now = Utc::now();
        let subject = self
            .token_codec
            .decode(&grant.access_token.0)
            .map(|claims| claims.subject)
            .ok_or(SessionError::MalformedToken)?;

        let expires_at = Self::expires_at(&grant, now)?;
        let refresh_token = grant.refresh_token.clone().filter(|t| !t.0.is_empty());
        if refresh_token.as_ref().is_some_and(|t| !t.is_cookie_safe()) {
            return Err(ProviderError::Decode("refresh token is not a valid cookie value".into()).into());
        }
        self.session_store
            .set(&subject, refresh_token.clone().map(SessionEntry::new))
            .await?;

        info!(%subject, has_refresh_token = refresh_token.is_some(), "login succeeded");

        Ok(LoginResult {
            subject,
            access_token: grant.access_token.clone(),
            refresh_token,
            expires_at,
        })
    }

    fn expires_at(grant: &TokenGrant, now: DateTime<Utc>) -> Result<DateTime<Utc>, SessionError> {
        grant.expires_at(now).ok_or_else(|| {
            ProviderError::Decode(format!("expires_in out of range: {}", grant.expires_in)).into()
        })
    }

    fn require(subject: Option<&SubjectId>) -> Result<&SubjectId, SessionError> {
        subject.ok_or(SessionError::Unauthenticated)
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn login(&self, input: LoginInput) -> Result<LoginResult, SessionError> {
        let LoginInput { login, password } = input;
        let grant = self
            .identity_provider
            .exchange_password(&login, &password)
            .await?;
        self.establish(grant).await
    }

    async fn login_with_code(&self, code: &str) -> Result<LoginResult, SessionError> {
        let grant = self
            .identity_provider
            .exchange_authorization_code(code)
            .await?;
        self.establish(grant).await
    }

    async fn refresh(
        &self,
        subject: Option<&SubjectId>,
        presented_refresh_token: Option<&str>,
    ) -> Result<RefreshResult, SessionError> {
        let subject = Self::require(subject)?;

        let Some(entry) = self.session_store.get(subject).await? else {
            debug!(%subject, "refresh without a stored session");
            return Err(SessionError::Unauthenticated);
        };
        let Some(presented) = presented_refresh_token else {
            debug!(%subject, "refresh without a refresh token cookie");
            return Err(SessionError::Unauthenticated);
        };
        if !entry.matches(presented) {
            warn!(%subject, "refresh token does not match the stored session");
            return Err(SessionError::Unauthenticated);
        }

        let stored = RefreshToken(presented.to_owned());
        let now = Utc::now();
        let grant = self
            .identity_provider
            .exchange_refresh_token(&stored)
            .await?;

        let expires_at = Self::expires_at(&grant, now)?;
        info!(%subject, "access token refreshed");
        Ok(RefreshResult {
            expires_at,
            access_token: grant.access_token,
        })
    }

    async fn logout(&self, subject: Option<&SubjectId>) -> Result<(), SessionError> {
        let subject = Self::require(subject)?;
        self.session_store.delete(subject).await?;
        info!(%subject, "logout succeeded");
        Ok(())
    }

    async fn user_info(&self, subject: Option<&SubjectId>) -> Result<UserProfile, SessionError> {
        let subject = Self::require(subject)?;
        Ok(self.identity_provider.get_user(subject).await?)
    }

    async fn register(&self, user: NewUser) -> Result<UserProfile, SessionError> {
        let profile = self.identity_provider.create_user(user).await?;
        info!(user_id = %profile.user_id, email = %profile.email, "user registered");
        Ok(profile)
    }

    fn login_page_url(&self) -> Option<String> {
        self.identity_provider.login_page_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{FakeIdentityProvider, UnverifiedJwtCodec};
    use crate::infra_memory::InMemorySessionStore;
    use chrono::Duration;

    struct Fixture {
        provider: Arc<FakeIdentityProvider>,
        store: Arc<InMemorySessionStore>,
        service: RealSessionService,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.add_user("u1", "p1", "sub1");
        let store = Arc::new(InMemorySessionStore::new());
        let service = RealSessionService::new(
            provider.clone(),
            store.clone(),
            Arc::new(UnverifiedJwtCodec::new()),
        );
        Fixture {
            provider,
            store,
            service,
        }
    }

    fn sub1() -> SubjectId {
        SubjectId("sub1".into())
    }

    fn credentials(login: &str, password: &str) -> LoginInput {
        LoginInput {
            login: login.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn login_persists_refresh_token_and_reports_expiry() {
        let f = fixture();
        let before = Utc::now();

        let result = f.service.login(credentials("u1", "p1")).await.unwrap();

        assert_eq!(result.subject, sub1());
        assert_eq!(result.refresh_token, Some(RefreshToken("RT1".into())));
        assert!(result.expires_at >= before + Duration::seconds(600));
        assert!(result.expires_at <= Utc::now() + Duration::seconds(600));

        let entry = f.store.get(&sub1()).await.unwrap().unwrap();
        assert!(entry.matches("RT1"));
    }

    #[tokio::test]
    async fn login_subject_matches_user_info() {
        let f = fixture();
        let result = f.service.login(credentials("u1", "p1")).await.unwrap();

        let profile = f.service.user_info(Some(&result.subject)).await.unwrap();
        assert_eq!(profile.user_id, result.subject);
    }

    #[tokio::test]
    async fn login_with_wrong_password_surfaces_upstream_error() {
        let f = fixture();
        let err = f.service.login(credentials("u1", "nope")).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Upstream(ProviderError::UpstreamAuth { status: 403, .. })
        ));
        assert_eq!(f.store.get(&sub1()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn relogin_replaces_previous_refresh_token() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();
        f.provider.set_next_refresh_token("RT2");
        f.service.login(credentials("u1", "p1")).await.unwrap();

        let err = f
            .service
            .refresh(Some(&sub1()), Some("RT1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthenticated));
        assert!(f.service.refresh(Some(&sub1()), Some("RT2")).await.is_ok());
    }

    #[tokio::test]
    async fn refresh_with_matching_cookie_returns_new_access_token() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();

        let refreshed = f
            .service
            .refresh(Some(&sub1()), Some("RT1"))
            .await
            .unwrap();

        assert_eq!(f.provider.refresh_calls(), 1);
        let claims = UnverifiedJwtCodec::new()
            .decode(&refreshed.access_token.0)
            .unwrap();
        assert_eq!(claims.subject, sub1());
    }

    #[tokio::test]
    async fn refresh_with_wrong_cookie_never_reaches_provider() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();

        let err = f
            .service
            .refresh(Some(&sub1()), Some("WRONG"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Unauthenticated));
        assert_eq!(f.provider.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn refresh_requires_subject_and_cookie() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();

        assert!(matches!(
            f.service.refresh(None, Some("RT1")).await,
            Err(SessionError::Unauthenticated)
        ));
        assert!(matches!(
            f.service.refresh(Some(&sub1()), None).await,
            Err(SessionError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn refresh_of_other_subject_is_rejected() {
        let f = fixture();
        f.provider.add_user("u2", "p2", "sub2");
        f.service.login(credentials("u1", "p1")).await.unwrap();

        let err = f
            .service
            .refresh(Some(&SubjectId("sub2".into())), Some("RT1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthenticated));
    }

    #[tokio::test]
    async fn logout_then_refresh_is_unauthenticated() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();

        f.service.logout(Some(&sub1())).await.unwrap();

        assert_eq!(f.store.get(&sub1()).await.unwrap(), None);
        assert!(matches!(
            f.service.refresh(Some(&sub1()), Some("RT1")).await,
            Err(SessionError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn logout_is_idempotent_but_needs_a_subject() {
        let f = fixture();
        f.service.logout(Some(&sub1())).await.unwrap();
        f.service.logout(Some(&sub1())).await.unwrap();
        assert!(matches!(
            f.service.logout(None).await,
            Err(SessionError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn code_login_without_refresh_token_stores_empty_entry() {
        let f = fixture();
        f.provider.add_code("CODE1", "sub1", None);

        let result = f.service.login_with_code("CODE1").await.unwrap();

        assert_eq!(result.refresh_token, None);
        let entry = f.store.get(&sub1()).await.unwrap().unwrap();
        assert!(entry.is_empty());
        assert!(matches!(
            f.service.refresh(Some(&sub1()), Some("")).await,
            Err(SessionError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn code_login_with_refresh_token_behaves_like_password_login() {
        let f = fixture();
        f.provider.add_code("CODE1", "sub1", Some("RT9"));

        f.service.login_with_code("CODE1").await.unwrap();

        assert!(f.service.refresh(Some(&sub1()), Some("RT9")).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_code_surfaces_upstream_error() {
        let f = fixture();
        assert!(matches!(
            f.service.login_with_code("nope").await,
            Err(SessionError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn undecodable_access_token_from_provider_is_malformed() {
        let f = fixture();
        f.provider.set_opaque_access_tokens(true);
        assert!(matches!(
            f.service.login(credentials("u1", "p1")).await,
            Err(SessionError::MalformedToken)
        ));
    }

    #[tokio::test]
    async fn out_of_range_lifetime_fails_before_touching_the_session() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();

        f.provider.set_next_refresh_token("RT2");
        f.provider.set_expires_in(u64::MAX);
        assert!(matches!(
            f.service.login(credentials("u1", "p1")).await,
            Err(SessionError::Upstream(ProviderError::Decode(_)))
        ));
        assert!(f.store.get(&sub1()).await.unwrap().unwrap().matches("RT1"));

        assert!(matches!(
            f.service.refresh(Some(&sub1()), Some("RT1")).await,
            Err(SessionError::Upstream(ProviderError::Decode(_)))
        ));
    }

    #[tokio::test]
    async fn refresh_token_unfit_for_a_cookie_is_refused() {
        let f = fixture();
        f.service.login(credentials("u1", "p1")).await.unwrap();
        f.provider
            .add_code("CODE1", "sub1", Some("RT2; Domain=evil.example"));

        assert!(matches!(
            f.service.login_with_code("CODE1").await,
            Err(SessionError::Upstream(ProviderError::Decode(_)))
        ));
        assert!(f.store.get(&sub1()).await.unwrap().unwrap().matches("RT1"));
    }

    #[tokio::test]
    async fn user_info_requires_subject() {
        let f = fixture();
        assert!(matches!(
            f.service.user_info(None).await,
            Err(SessionError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn register_proxies_to_provider() {
        let f = fixture();
        let profile = f
            .service
            .register(NewUser {
                name: "Ada".into(),
                surname: "Lovelace".into(),
                login: "ada@example.com".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.name, "Ada Lovelace");
    }
}
