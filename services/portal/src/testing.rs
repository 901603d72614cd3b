//! In-memory stores and an app harness for tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::{Router, http::header, response::Response};
use chrono::Utc;
use common::error::{CacheError, CacheResult, DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use tower_cookies::Key;
use uuid::Uuid;

use crate::{
    middleware::SESSION_COOKIE,
    models::{NewUser, SessionRecord, User},
    password::{PasswordService, fast_params},
    repositories::UserStore,
    routes,
    session::{SessionId, SessionStore},
    state::AppState,
};

/// User store enforcing username uniqueness like the `users` table does
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    /// Delete an account, leaving any of its sessions behind
    pub async fn remove(&self, id: Uuid) {
        self.users.lock().await.retain(|u| u.id != id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().await;

        if users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::UniqueViolation(
                "users_username_key".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Session store keeping JSON records in a map; can be told to fail
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
    failing: AtomicBool,
}

impl MemorySessionStore {
    /// Make every subsequent operation fail with a command error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.entries.lock().await.contains_key(id.as_str())
    }

    pub async fn ttl_of(&self, id: &SessionId) -> Option<u64> {
        self.entries
            .lock()
            .await
            .get(id.as_str())
            .map(|(_, ttl)| *ttl)
    }

    pub async fn insert_raw(&self, id: &SessionId, value: &str) {
        self.entries
            .lock()
            .await
            .insert(id.as_str().to_string(), (value.to_string(), 60));
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            let err = redis::RedisError::from((redis::ErrorKind::IoError, "session store down"));
            return Err(CacheError::Command(err));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        self.check()?;
        let value = serde_json::to_string(record)?;
        self.entries
            .lock()
            .await
            .insert(id.as_str().to_string(), (value, ttl_seconds));
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> CacheResult<Option<SessionRecord>> {
        self.check()?;
        match self.entries.lock().await.get(id.as_str()) {
            Some((value, _)) => Ok(Some(serde_json::from_str(value)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &SessionId) -> CacheResult<()> {
        self.check()?;
        self.entries.lock().await.remove(id.as_str());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.check().is_ok()
    }
}

/// Router wired to in-memory stores, with handles to inspect them
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserStore::default());
        let sessions = Arc::new(MemorySessionStore::default());

        let mut state = AppState::new(
            users.clone(),
            sessions.clone(),
            3600,
            Key::from(&[7u8; 64]),
            false,
        );
        state.passwords = PasswordService::new(fast_params());

        let router = routes::create_router(
            state.clone(),
            concat!(env!("CARGO_MANIFEST_DIR"), "/public"),
        );

        Self {
            router,
            state,
            users,
            sessions,
        }
    }
}

/// The `name=value` pair of the session cookie set by a response, if any
pub fn session_cookie_header(response: &Response) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);

    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(&prefix))
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.len() > prefix.len())
        .map(str::to_string)
}
