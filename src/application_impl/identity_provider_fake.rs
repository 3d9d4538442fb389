use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

pub const FAKE_EXPIRES_IN: u64 = 600;

#[derive(Default)]
struct FakeState {
    users: HashMap<String, (String, SubjectId)>,
    codes: HashMap<String, (SubjectId, Option<String>)>,
    refresh_tokens: HashMap<String, SubjectId>,
    profiles: HashMap<SubjectId, UserProfile>,
    next_refresh_token: Option<String>,
}

/// In-memory identity provider for tests. Issues real (HS256) JWTs so the
/// token codec sees realistic input.
#[derive(Default)]
pub struct FakeIdentityProvider {
    state: Mutex<FakeState>,
    refresh_calls: AtomicUsize,
    opaque_access_tokens: AtomicBool,
    // 0 means FAKE_EXPIRES_IN
    expires_in: AtomicU64,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, login: &str, password: &str, subject: &str) {
        let subject = SubjectId(subject.to_owned());
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(
            subject.clone(),
            UserProfile {
                user_id: subject.clone(),
                name: login.to_owned(),
                email: format!("{}@example.com", login),
            },
        );
        state
            .users
            .insert(login.to_owned(), (password.to_owned(), subject));
    }

    pub fn add_code(&self, code: &str, subject: &str, refresh_token: Option<&str>) {
        self.state.lock().unwrap().codes.insert(
            code.to_owned(),
            (SubjectId(subject.to_owned()), refresh_token.map(str::to_owned)),
        );
    }

    /// Refresh token handed out by the next password login. Defaults to "RT1".
    pub fn set_next_refresh_token(&self, token: &str) {
        self.state.lock().unwrap().next_refresh_token = Some(token.to_owned());
    }

    pub fn set_opaque_access_tokens(&self, opaque: bool) {
        self.opaque_access_tokens.store(opaque, Ordering::SeqCst);
    }

    pub fn set_expires_in(&self, expires_in: u64) {
        self.expires_in.store(expires_in, Ordering::SeqCst);
    }

    fn expires_in(&self) -> u64 {
        match self.expires_in.load(Ordering::SeqCst) {
            0 => FAKE_EXPIRES_IN,
            expires_in => expires_in,
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn access_token_for(subject: &SubjectId) -> AccessToken {
        let exp = Utc::now().timestamp() + FAKE_EXPIRES_IN as i64;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({"sub": subject.0, "exp": exp}),
            &EncodingKey::from_secret(b"fake-provider"),
        )
        .unwrap();
        AccessToken(token)
    }

    fn mint(&self, subject: &SubjectId) -> AccessToken {
        if self.opaque_access_tokens.load(Ordering::SeqCst) {
            AccessToken("AT-opaque".to_owned())
        } else {
            Self::access_token_for(subject)
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn exchange_password(
        &self,
        login: &str,
        password: &str,
    ) -> Result<TokenGrant, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let subject = match state.users.get(login) {
            Some((expected, subject)) if expected == password => subject.clone(),
            _ => return Err(ProviderError::upstream(403, "Wrong email or password.")),
        };
        let refresh = state
            .next_refresh_token
            .take()
            .unwrap_or_else(|| "RT1".to_owned());
        state.refresh_tokens.insert(refresh.clone(), subject.clone());
        Ok(TokenGrant {
            access_token: self.mint(&subject),
            refresh_token: Some(RefreshToken(refresh)),
            expires_in: self.expires_in(),
        })
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<TokenGrant, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let subject = state
            .refresh_tokens
            .get(&refresh_token.0)
            .cloned()
            .ok_or_else(|| ProviderError::upstream(403, "Unknown or invalid refresh token."))?;
        Ok(TokenGrant {
            access_token: self.mint(&subject),
            refresh_token: None,
            expires_in: self.expires_in(),
        })
    }

    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenGrant, ProviderError> {
        let mut state = self.state.lock().unwrap();
        let (subject, refresh) = state
            .codes
            .remove(code)
            .ok_or_else(|| ProviderError::upstream(403, "Invalid authorization code"))?;
        if let Some(refresh) = &refresh {
            state.refresh_tokens.insert(refresh.clone(), subject.clone());
        }
        Ok(TokenGrant {
            access_token: self.mint(&subject),
            refresh_token: refresh.map(RefreshToken),
            expires_in: self.expires_in(),
        })
    }

    async fn get_user(&self, subject: &SubjectId) -> Result<UserProfile, ProviderError> {
        self.state
            .lock()
            .unwrap()
            .profiles
            .get(subject)
            .cloned()
            .ok_or_else(|| ProviderError::upstream(404, "The user does not exist."))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, ProviderError> {
        let subject = SubjectId(format!("fake|{}", user.login));
        let profile = UserProfile {
            user_id: subject.clone(),
            name: format!("{} {}", user.name, user.surname),
            email: user.login.clone(),
        };
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(subject.clone(), profile.clone());
        state.users.insert(user.login, (user.password, subject));
        Ok(profile)
    }

    fn login_page_url(&self) -> Option<String> {
        None
    }
}
