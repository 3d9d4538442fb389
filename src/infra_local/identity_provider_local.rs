use crate::domain_model::*;
use crate::domain_port::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalUser {
    pub login: String,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct LocalProviderConfig {
    pub signing_key: Vec<u8>,
    pub access_ttl: Duration,
    pub users: Vec<LocalUser>,
}

#[derive(Debug, Serialize)]
struct LocalClaims {
    sub: String,
    login: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
struct Account {
    subject: SubjectId,
    username: String,
    password_hash: String,
}

/// Identity provider that signs its own HS256 access tokens for a fixed
/// table of users. Each login holds at most one refresh token, kept in
/// memory only, so a restart invalidates every outstanding refresh token.
pub struct LocalIdentityProvider {
    signing_key: EncodingKey,
    access_ttl: Duration,
    accounts: DashMap<String, Account>,
    /// login -> its current refresh token
    refresh_tokens: DashMap<String, String>,
}

impl LocalIdentityProvider {
    pub fn new(cfg: LocalProviderConfig) -> Self {
        let accounts = DashMap::new();
        for user in cfg.users {
            accounts.insert(
                user.login.clone(),
                Account {
                    subject: Self::subject_for(&user.login),
                    username: user.username,
                    password_hash: user.password_hash,
                },
            );
        }
        Self {
            signing_key: EncodingKey::from_secret(&cfg.signing_key),
            access_ttl: cfg.access_ttl,
            accounts,
            refresh_tokens: DashMap::new(),
        }
    }

    /// Stable subject id derived from the login.
    pub fn subject_for(login: &str) -> SubjectId {
        SubjectId(Uuid::new_v5(&Uuid::NAMESPACE_OID, login.as_bytes()).to_string())
    }

    pub fn hash_password(password: &str) -> Result<String, ProviderError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ProviderError::upstream(500, e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify_password(password: &str, password_hash: &str) -> Result<bool, ProviderError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| ProviderError::upstream(500, format!("invalid PHC hash: {}", e)))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ProviderError::upstream(500, format!("verify error: {}", e))),
        }
    }

    fn issue_access_token(&self, login: &str, subject: &SubjectId) -> Result<AccessToken, ProviderError> {
        let iat = Utc::now().timestamp();
        let claims = LocalClaims {
            sub: subject.0.clone(),
            login: login.to_owned(),
            iat,
            exp: iat + self.access_ttl.as_secs() as i64,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.signing_key)
            .map_err(|e| ProviderError::upstream(500, e.to_string()))?;
        Ok(AccessToken(token))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn exchange_password(
        &self,
        login: &str,
        password: &str,
    ) -> Result<TokenGrant, ProviderError> {
        let account = self
            .accounts
            .get(login)
            .map(|account| account.value().clone())
            .ok_or_else(|| ProviderError::upstream(401, "Wrong login or password"))?;
        if !Self::verify_password(password, &account.password_hash)? {
            return Err(ProviderError::upstream(401, "Wrong login or password"));
        }

        let access_token = self.issue_access_token(login, &account.subject)?;
        let refresh_token = Uuid::new_v4().simple().to_string();
        self.refresh_tokens
            .insert(login.to_owned(), refresh_token.clone());

        Ok(TokenGrant {
            access_token,
            refresh_token: Some(RefreshToken(refresh_token)),
            expires_in: self.access_ttl.as_secs(),
        })
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, ProviderError> {
        let login = self
            .refresh_tokens
            .iter()
            .find(|issued| issued.value() == &refresh_token.0)
            .map(|issued| issued.key().clone())
            .ok_or_else(|| ProviderError::upstream(401, "Unknown refresh token"))?;
        let Some(subject) = self
            .accounts
            .get(&login)
            .map(|account| account.subject.clone())
        else {
            self.refresh_tokens.remove(&login);
            return Err(ProviderError::upstream(401, "Unknown refresh token"));
        };

        Ok(TokenGrant {
            access_token: self.issue_access_token(&login, &subject)?,
            refresh_token: None,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    async fn exchange_authorization_code(&self, _code: &str) -> Result<TokenGrant, ProviderError> {
        Err(ProviderError::upstream(
            400,
            "authorization code flow is not supported by the local provider",
        ))
    }

    async fn get_user(&self, subject: &SubjectId) -> Result<UserProfile, ProviderError> {
        self.accounts
            .iter()
            .find(|account| account.subject == *subject)
            .map(|account| UserProfile {
                user_id: account.subject.clone(),
                name: account.username.clone(),
                email: account.key().clone(),
            })
            .ok_or_else(|| ProviderError::upstream(404, "The user does not exist."))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, ProviderError> {
        let password_hash = Self::hash_password(&user.password)?;
        let username = format!("{} {}", user.name, user.surname);

        match self.accounts.entry(user.login.clone()) {
            Entry::Occupied(_) => Err(ProviderError::upstream(409, "The user already exists.")),
            Entry::Vacant(slot) => {
                let subject = Self::subject_for(&user.login);
                slot.insert(Account {
                    subject: subject.clone(),
                    username: username.clone(),
                    password_hash,
                });
                Ok(UserProfile {
                    user_id: subject,
                    name: username,
                    email: user.login,
                })
            }
        }
    }

    fn login_page_url(&self) -> Option<String> {
        None
    }
}
