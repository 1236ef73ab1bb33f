use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the pre-seeded guest directory. Never written by the RSVP flow.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Guest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartyMember {
    pub first_name: String,
    pub last_name: String,
}

impl PartyMember {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last", the key used by selection state and notification lists.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn matches(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name.eq_ignore_ascii_case(first_name) && self.last_name.eq_ignore_ascii_case(last_name)
    }
}

impl From<&Guest> for PartyMember {
    fn from(guest: &Guest) -> Self {
        Self::new(guest.first_name.clone(), guest.last_name.clone())
    }
}
