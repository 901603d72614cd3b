//! Server-side sessions
//!
//! A session is an opaque random id held by the client in a signed cookie,
//! pointing at a [`SessionRecord`] kept in the session store. Only the user
//! id is stored; the user itself is reloaded on every request.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use common::{
    cache::RedisPool,
    error::{CacheError, CacheResult},
};
use rand::distributions::{Alphanumeric, DistString};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::SessionRecord;

/// Length of generated session ids
const SESSION_ID_LENGTH: usize = 48;

/// Opaque session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session id
    pub fn generate() -> Self {
        Self(Alphanumeric.sample_string(&mut rand::thread_rng(), SESSION_ID_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a record, replacing any existing one, expiring after `ttl_seconds`
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl_seconds: u64,
    ) -> CacheResult<()>;

    /// Load a record; `None` when missing or expired
    async fn load(&self, id: &SessionId) -> CacheResult<Option<SessionRecord>>;

    /// Remove a record; removing a missing record is not an error
    async fn delete(&self, id: &SessionId) -> CacheResult<()>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> bool;
}

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    fn key(id: &SessionId) -> String {
        format!("session:{}", id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let value = serde_json::to_string(record)?;
        self.redis_pool
            .set(&Self::key(id), &value, Some(ttl_seconds))
            .await
    }

    async fn load(&self, id: &SessionId) -> CacheResult<Option<SessionRecord>> {
        match self.redis_pool.get(&Self::key(id)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &SessionId) -> CacheResult<()> {
        self.redis_pool.delete(&Self::key(id)).await?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        match self.redis_pool.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!("Session store health check failed: {}", e);
                false
            }
        }
    }
}

/// Session lifecycle on top of a [`SessionStore`]
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl_seconds: u64,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Create a new session for a user
    pub async fn create_session(&self, user_id: Uuid) -> CacheResult<SessionId> {
        let id = SessionId::generate();
        self.store
            .save(&id, &SessionRecord::new(user_id), self.ttl_seconds)
            .await?;

        info!("Created session for user: {}", user_id);
        Ok(id)
    }

    /// Resolve a session id to the user it was created for
    ///
    /// Unknown and expired sessions resolve to `None`. A record that no
    /// longer decodes is discarded and also resolves to `None`.
    pub async fn resolve(&self, id: &SessionId) -> CacheResult<Option<Uuid>> {
        match self.store.load(id).await {
            Ok(record) => Ok(record.map(|record| record.user_id)),
            Err(CacheError::Serialization(e)) => {
                warn!("Discarding unreadable session record: {}", e);
                self.store.delete(id).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Destroy a session
    pub async fn destroy_session(&self, id: &SessionId) -> CacheResult<()> {
        self.store.delete(id).await?;
        info!("Destroyed session");
        Ok(())
    }

    /// Whether the session store is reachable
    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}
