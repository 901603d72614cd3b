//! Failed-login limiter for slowing down password guessing
//!
//! Callers key attempts by client address and username, so one client
//! cannot lock an account out for everybody else.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Login limiter configuration
#[derive(Debug, Clone)]
pub struct LoginLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_failures: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for LoginLimiterConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

#[derive(Debug)]
struct LimiterEntry {
    failures: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl LimiterEntry {
    /// Neither the counting window nor a ban is still running
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        let window_over = now.duration_since(self.window_start) >= window;
        let ban_over = self.ban_expires.is_none_or(|expires| now >= expires);
        window_over && ban_over
    }
}

/// Tracks login attempts per key (client address and username)
#[derive(Debug, Clone)]
pub struct LoginLimiter {
    config: LoginLimiterConfig,
    entries: Arc<Mutex<HashMap<String, LimiterEntry>>>,
}

impl LoginLimiter {
    /// Create a new login limiter
    pub fn new(config: LoginLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Admit a login attempt for this key and count it as a failure
    ///
    /// Returns `false` while the key is banned. The check and the count
    /// happen under one lock, so concurrent attempts cannot overshoot the
    /// limit. A successful login must call [`LoginLimiter::reset`].
    pub async fn try_attempt(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);

        // Drop keys whose window and ban have both run out.
        entries.retain(|_, entry| !entry.is_stale(now, window));

        let entry = entries.entry(key.to_string()).or_insert(LimiterEntry {
            failures: 0,
            window_start: now,
            ban_expires: None,
        });

        if entry.ban_expires.is_some_and(|expires| now < expires) {
            return false;
        }

        if now.duration_since(entry.window_start) >= window {
            entry.failures = 0;
            entry.window_start = now;
            entry.ban_expires = None;
        }

        entry.failures += 1;

        if entry.failures >= self.config.max_failures && entry.ban_expires.is_none() {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Blocking logins for {} for {} seconds after {} failures",
                key, self.config.ban_duration_seconds, entry.failures
            );
        }

        true
    }

    /// Forget failures for a key after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl LoginLimiter {
    /// Whether logins for this key are currently refused
    pub async fn is_blocked(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;

        let Some(entry) = entries.get(key) else {
            return false;
        };
        let ban_expires = entry.ban_expires;

        match ban_expires {
            Some(expires) if Instant::now() < expires => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Count a failed login, banning the key once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(LimiterEntry {
            failures: 0,
            window_start: now,
            ban_expires: None,
        });

        if now.duration_since(entry.window_start) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;

        if entry.failures >= self.config.max_failures && entry.ban_expires.is_none() {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Blocking logins for {} for {} seconds after {} failures",
                key, self.config.ban_duration_seconds, entry.failures
            );
        }
    }

}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::new(LoginLimiterConfig::default())
    }
}
