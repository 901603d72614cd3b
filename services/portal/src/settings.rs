//! Application configuration
//!
//! Infrastructure settings (database, Redis) are read by `common`; this
//! module covers the web process itself.

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;
use sha2::{Digest, Sha512};
use tower_cookies::Key;

/// Minimum accepted length of the session signing secret, in bytes
const MIN_SECRET_LENGTH: usize = 32;

/// Default session lifetime: 14 days
const DEFAULT_SESSION_TTL_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Web process configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Port to listen on
    pub port: u16,
    /// Secret used to sign session cookies
    pub secret_key: String,
    /// Server-side session lifetime in seconds
    pub session_ttl_seconds: u64,
    /// Directory served for static assets
    pub static_dir: String,
    /// Set the `Secure` attribute on session cookies
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    /// - `PORT`: Listen port (default: 3000)
    /// - `SECRET_KEY`: Session cookie signing secret, at least 32 bytes (required)
    /// - `SESSION_TTL_SECONDS`: Session lifetime (default: 1209600, 14 days)
    /// - `STATIC_DIR`: Static asset directory (default: the crate's `public/`)
    /// - `COOKIE_SECURE`: Send the session cookie over HTTPS only (default: false)
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .set_default("port", 3000_i64)?
            .set_default("session_ttl_seconds", DEFAULT_SESSION_TTL_SECONDS)?
            .set_default("static_dir", concat!(env!("CARGO_MANIFEST_DIR"), "/public"))?
            .set_default("cookie_secure", false)?
            .add_source(Environment::default())
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.secret_key.len() < MIN_SECRET_LENGTH {
            anyhow::bail!(
                "SECRET_KEY must be at least {} bytes long",
                MIN_SECRET_LENGTH
            );
        }

        if self.session_ttl_seconds == 0 {
            anyhow::bail!("SESSION_TTL_SECONDS must be greater than zero");
        }

        Ok(())
    }

    /// Derive the cookie signing key from the configured secret
    pub fn cookie_key(&self) -> Key {
        let digest = Sha512::digest(self.secret_key.as_bytes());
        Key::from(digest.as_slice())
    }
}
