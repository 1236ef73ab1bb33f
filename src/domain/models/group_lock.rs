use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Sentinel row: its presence means the group already submitted once.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GroupLock {
    pub group_id: String,
    pub created_at: DateTime<Utc>,
}

impl GroupLock {
    pub fn new(group_id: String) -> Self {
        Self {
            group_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Acquired,
    AlreadyLocked,
}
