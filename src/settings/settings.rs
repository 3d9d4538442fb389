use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    #[serde(default)]
    pub session: Session,
    pub store: Store,
    pub provider: Provider,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    /// TLS is enabled only when both paths are set.
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    /// Request header carrying `<scheme> <access token>`.
    #[serde(default = "default_session_header")]
    pub header: String,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Unset means a browser-session cookie.
    pub cookie_max_age_secs: Option<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            header: default_session_header(),
            cookie_secure: false,
            cookie_max_age_secs: None,
        }
    }
}

fn default_session_header() -> String {
    "Authorization".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "file" or "memory"
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Provider {
    pub backend: String, // "auth0" or "local"
    pub auth0: Option<Auth0>,
    pub local: Option<Local>,
}

#[derive(Deserialize)]
pub struct Auth0 {
    pub domain: String,
    pub client_id: String,
    /// Overridden by `AUTH0_CLIENT_SECRET` when set.
    #[serde(default)]
    pub client_secret: String,
    pub audience: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    pub redirect_uri: Option<String>,
    pub picture: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Auth0 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth0")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("audience", &self.audience)
            .field("realm", &self.realm)
            .field("redirect_uri", &self.redirect_uri)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

fn default_realm() -> String {
    "Username-Password-Authentication".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize)]
pub struct Local {
    /// Overridden by `LOCAL_SIGNING_KEY` when set.
    #[serde(default)]
    pub signing_key: String,
    #[serde(default = "default_expires_in_secs")]
    pub expires_in_secs: u64,
    #[serde(default)]
    pub users: Vec<LocalUser>,
}

impl std::fmt::Debug for Local {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Local")
            .field("expires_in_secs", &self.expires_in_secs)
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}

fn default_expires_in_secs() -> u64 {
    600
}

#[derive(Debug, Deserialize)]
pub struct LocalUser {
    pub login: String,
    pub username: String,
    pub password_hash: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
