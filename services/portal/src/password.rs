//! Password hashing with argon2
//!
//! Hashes are stored in PHC string format, so the salt and cost parameters
//! travel with the hash and verification never needs outside state.
//! Hashing is CPU bound and runs on the blocking thread pool.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use thiserror::Error;
use tokio::{
    sync::OnceCell,
    task::{self, JoinError},
};

/// Password hashing errors
#[derive(Error, Debug)]
pub enum PasswordError {
    /// The hasher rejected the input or parameters
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// A stored hash is not a valid PHC string
    #[error("Stored password hash is malformed: {0}")]
    InvalidHash(String),

    /// The blocking task panicked or was cancelled
    #[error("Password task failed: {0}")]
    Task(#[from] JoinError),
}

/// Plaintext behind the hash checked for unknown usernames
const DUMMY_PASSWORD: &str = "portal-dummy-password";

/// Argon2id hasher with fixed cost parameters
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordService {
    /// Create a hasher using the given argon2 cost parameters
    pub fn new(params: Params) -> Self {
        Self {
            params,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        let params = self.params.clone();

        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut rand::thread_rng());
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| PasswordError::Hash(e.to_string()))
        })
        .await?
    }

    /// Check a password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch; errors only when the stored hash
    /// cannot be parsed.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();
        let params = self.params.clone();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&stored_hash)
                .map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

            Ok(Self::argon2(params)
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok())
        })
        .await?
    }

    /// Spend the same effort as [`PasswordService::verify`] without an account
    ///
    /// Used for unknown usernames so response time does not reveal which
    /// accounts exist. The dummy hash is made once with this service's params.
    pub async fn verify_dummy(&self, password: &str) -> Result<(), PasswordError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await?;

        self.verify(password, dummy_hash).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn dummy_hash_ready(&self) -> bool {
        self.dummy_hash.initialized()
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
pub(crate) fn fast_params() -> Params {
    Params::new(1024, 1, 1, None).expect("valid argon2 params")
}
