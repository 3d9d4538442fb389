use crate::domain_model::*;
use crate::domain_port::*;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const PASSWORD_REALM_GRANT: &str = "http://auth0.com/oauth/grant-type/password-realm";

#[derive(Debug, Clone)]
pub struct Auth0Config {
    /// Tenant domain (`example.eu.auth0.com`). A full `http(s)://` base URL
    /// is also accepted.
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub audience: String,
    /// Database connection used for password logins and user creation.
    pub realm: String,
    /// Callback registered for the authorization-code flow.
    pub redirect_uri: Option<String>,
    pub picture: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct Auth0User {
    user_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl From<Auth0User> for UserProfile {
    fn from(user: Auth0User) -> Self {
        UserProfile {
            user_id: SubjectId(user.user_id),
            name: user.name,
            email: user.email,
        }
    }
}

pub struct Auth0IdentityProvider {
    cfg: Auth0Config,
    base: Url,
    client: reqwest::Client,
}

impl Auth0IdentityProvider {
    pub fn new(cfg: Auth0Config) -> Result<Self, ProviderError> {
        let base = if cfg.domain.starts_with("http://") || cfg.domain.starts_with("https://") {
            cfg.domain.clone()
        } else {
            format!("https://{}", cfg.domain)
        };
        let base = Url::parse(&base).map_err(|e| ProviderError::Transport(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ProviderError::Transport(format!(
                "not a usable base url: {}",
                base
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { cfg, base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn expect_status(response: Response, expected: StatusCode) -> Result<Response, ProviderError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            body
        };
        Err(ProviderError::upstream(status.as_u16(), message))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, ProviderError> {
        let response = self
            .client
            .post(self.endpoint(&["oauth", "token"]))
            .form(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Machine-to-machine token for the management API.
    async fn management_token(&self) -> Result<String, ProviderError> {
        let token = self
            .request_token(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.cfg.client_id.as_str()),
                ("client_secret", self.cfg.client_secret.as_str()),
                ("audience", self.cfg.audience.as_str()),
            ])
            .await?;
        Ok(token.access_token)
    }

    fn grant(token: TokenResponse, keep_refresh_token: bool) -> TokenGrant {
        TokenGrant {
            access_token: AccessToken(token.access_token),
            refresh_token: token
                .refresh_token
                .filter(|_| keep_refresh_token)
                .map(RefreshToken),
            expires_in: token.expires_in,
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for Auth0IdentityProvider {
    async fn exchange_password(
        &self,
        login: &str,
        password: &str,
    ) -> Result<TokenGrant, ProviderError> {
        let token = self
            .request_token(&[
                ("grant_type", PASSWORD_REALM_GRANT),
                ("realm", self.cfg.realm.as_str()),
                ("scope", "offline_access"),
                ("username", login),
                ("password", password),
                ("client_id", self.cfg.client_id.as_str()),
                ("client_secret", self.cfg.client_secret.as_str()),
                ("audience", self.cfg.audience.as_str()),
            ])
            .await?;
        Ok(Self::grant(token, true))
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, ProviderError> {
        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.cfg.client_id.as_str()),
                ("client_secret", self.cfg.client_secret.as_str()),
                ("refresh_token", refresh_token.0.as_str()),
            ])
            .await?;
        Ok(Self::grant(token, false))
    }

    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenGrant, ProviderError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.cfg.client_id.as_str()),
            ("client_secret", self.cfg.client_secret.as_str()),
            ("code", code),
        ];
        if let Some(redirect_uri) = &self.cfg.redirect_uri {
            form.push(("redirect_uri", redirect_uri.as_str()));
        }
        let token = self.request_token(&form).await?;
        Ok(Self::grant(token, true))
    }

    async fn get_user(&self, subject: &SubjectId) -> Result<UserProfile, ProviderError> {
        let management_token = self.management_token().await?;
        let response = self
            .client
            .get(self.endpoint(&["api", "v2", "users", subject.as_str()]))
            .bearer_auth(management_token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        let user = response
            .json::<Auth0User>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(user.into())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, ProviderError> {
        let management_token = self.management_token().await?;
        let NewUser {
            name,
            surname,
            login,
            password,
        } = user;
        let payload = json!({
            "email": login,
            "user_metadata": {},
            "blocked": false,
            "email_verified": false,
            "app_metadata": {},
            "given_name": name,
            "family_name": surname,
            "name": format!("{} {}", name, surname),
            "picture": self.cfg.picture,
            "connection": self.cfg.realm,
            "password": password,
            "verify_email": false,
        });
        let response = self
            .client
            .post(self.endpoint(&["api", "v2", "users"]))
            .bearer_auth(management_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let response = Self::expect_status(response, StatusCode::CREATED).await?;
        let user = response
            .json::<Auth0User>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(user.into())
    }

    fn login_page_url(&self) -> Option<String> {
        let redirect_uri = self.cfg.redirect_uri.as_deref()?;
        let mut url = self.endpoint(&["authorize"]);
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.cfg.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", "offline_access openid profile")
            .append_pair("audience", &self.cfg.audience);
        Some(url.into())
    }
}
