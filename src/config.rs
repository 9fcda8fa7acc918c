use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tower_sessions::cookie::Key;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SESSION_SECRET is not valid base64: {0}")]
    SecretEncoding(#[from] base64::DecodeError),
    #[error("SESSION_SECRET is too short: {0}")]
    SecretLength(#[from] tower_sessions::cookie::KeyError),
}

/// Process-wide settings, parsed once at startup.
///
/// Every flag can also be supplied through the environment (and so through `.env`).
#[derive(Parser, Debug, Clone)]
#[command(name = "gatekeep", about = "Username/password login demo")]
pub struct Config {
    #[arg(long, env = "SITE_ADDR", default_value = "0.0.0.0:3000")]
    pub site_addr: String,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://db.sqlite")]
    pub database_url: String,

    /// Base64 encoded key material, at least 64 bytes once decoded.
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Directories searched, in order, by the development static file route.
    #[arg(
        long = "static-dir",
        env = "STATIC_DIRS",
        value_delimiter = ',',
        default_values = ["css", "js"]
    )]
    pub static_dirs: Vec<PathBuf>,

    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    #[arg(long, env = "SECURE_COOKIES")]
    pub secure_cookies: bool,
}

impl Config {
    /// The signing key for the session cookie.
    ///
    /// Without a configured secret a fresh key is generated, which means
    /// sessions are lost on every restart.
    pub fn session_key(&self) -> Result<Key, ConfigError> {
        match &self.session_secret {
            Some(secret) => {
                let bytes = STANDARD.decode(secret.trim())?;
                Ok(Key::try_from(bytes.as_slice())?)
            }
            None => {
                tracing::warn!("SESSION_SECRET not set, generating an ephemeral session key");
                Ok(Key::generate())
            }
        }
    }
}
