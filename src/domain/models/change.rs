use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TABLE_GUESTS: &str = "guests";
pub const TABLE_RSVPS: &str = "rsvps";
pub const TABLE_GROUP_LOCKS: &str = "group_locks";

pub const WATCHED_TABLES: [&str; 3] = [TABLE_GUESTS, TABLE_RSVPS, TABLE_GROUP_LOCKS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Row-level change notification, shaped like the admin dashboard expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub row: Value,
}

impl ChangeEvent {
    pub fn new<T: Serialize>(table: &str, kind: ChangeKind, row: &T) -> Self {
        Self {
            table: table.to_string(),
            kind,
            row: serde_json::to_value(row).unwrap_or(Value::Null),
        }
    }
}
