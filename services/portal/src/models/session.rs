//! Session model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side session record, stored as JSON under `session:<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record for a freshly authenticated user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            created_at: Utc::now(),
        }
    }
}
