use crate::api::v1::CookiePolicy;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_auth0::*;
use crate::infra_file::*;
use crate::infra_local::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_STORE_PATH: &str = "tokenStorage.json";

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub cookie_policy: CookiePolicy,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let session_store: Arc<dyn SessionStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(InMemorySessionStore::new()),
            "file" => {
                let path = settings.store.path.as_deref().unwrap_or(DEFAULT_STORE_PATH);
                Arc::new(FileSessionStore::open(path).await?)
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let identity_provider: Arc<dyn IdentityProvider> = match settings.provider.backend.as_str() {
            "auth0" => {
                let auth0 = settings
                    .provider
                    .auth0
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("provider.auth0 section is missing"))?;
                let client_secret = std::env::var("AUTH0_CLIENT_SECRET")
                    .unwrap_or_else(|_| auth0.client_secret.clone());
                Arc::new(Auth0IdentityProvider::new(Auth0Config {
                    domain: auth0.domain.clone(),
                    client_id: auth0.client_id.clone(),
                    client_secret,
                    audience: auth0.audience.clone(),
                    realm: auth0.realm.clone(),
                    redirect_uri: auth0.redirect_uri.clone(),
                    picture: auth0.picture.clone(),
                    timeout: Duration::from_secs(auth0.timeout_secs),
                })?)
            }
            "local" => {
                let local = settings
                    .provider
                    .local
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("provider.local section is missing"))?;
                let signing_key = std::env::var("LOCAL_SIGNING_KEY")
                    .unwrap_or_else(|_| local.signing_key.clone());
                if signing_key.is_empty() {
                    return Err(anyhow::anyhow!("local provider needs a signing key"));
                }
                let users = local
                    .users
                    .iter()
                    .map(|user| LocalUser {
                        login: user.login.clone(),
                        username: user.username.clone(),
                        password_hash: user.password_hash.clone(),
                    })
                    .collect();
                Arc::new(LocalIdentityProvider::new(LocalProviderConfig {
                    signing_key: signing_key.into_bytes(),
                    access_ttl: Duration::from_secs(local.expires_in_secs),
                    users,
                }))
            }
            other => return Err(anyhow::anyhow!("Unknown provider backend: {}", other)),
        };

        let token_codec: Arc<dyn TokenCodec> = Arc::new(UnverifiedJwtCodec::new());
        let cookie_policy = CookiePolicy {
            secure: settings.session.cookie_secure,
            max_age_secs: settings.session.cookie_max_age_secs,
        };

        info!(
            store = %settings.store.backend,
            provider = %settings.provider.backend,
            "server started"
        );

        Ok(Self::from_parts(
            identity_provider,
            session_store,
            token_codec,
            &settings.session.header,
            cookie_policy,
        ))
    }

    pub fn from_parts(
        identity_provider: Arc<dyn IdentityProvider>,
        session_store: Arc<dyn SessionStore>,
        token_codec: Arc<dyn TokenCodec>,
        session_header: &str,
        cookie_policy: CookiePolicy,
    ) -> Self {
        let session_validator: Arc<dyn SessionValidator> = Arc::new(BearerSessionValidator::new(
            session_header,
            token_codec.clone(),
        ));
        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            identity_provider,
            session_store,
            token_codec,
        ));

        Self {
            session_service,
            session_validator,
            cookie_policy,
        }
    }
}
