use std::sync::Arc;

use tower_cookies::Key;

use crate::{
    password::PasswordService,
    rate_limiter::LoginLimiter,
    repositories::UserStore,
    session::{SessionManager, SessionStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionManager,
    pub passwords: PasswordService,
    pub login_limiter: LoginLimiter,
    pub cookie_key: Key,
    /// Mark session cookies `Secure`
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        session_store: Arc<dyn SessionStore>,
        session_ttl_seconds: u64,
        cookie_key: Key,
        cookie_secure: bool,
    ) -> Self {
        Self {
            users,
            sessions: SessionManager::new(session_store, session_ttl_seconds),
            passwords: PasswordService::default(),
            login_limiter: LoginLimiter::default(),
            cookie_key,
            cookie_secure,
        }
    }
}
