use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;

/// One attendance record per named person. `(first_name, last_name, group_id)` is unique;
/// a party-less submission carries an empty `group_id`.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Rsvp {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub group_id: String,
    pub attending: bool,
    pub guests: i32,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub diet: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewRsvpParams {
    pub first_name: String,
    pub last_name: String,
    pub group_id: Option<String>,
    pub attending: bool,
    pub guests: i32,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub diet: Option<String>,
    pub message: Option<String>,
}

impl Rsvp {
    pub fn new(params: NewRsvpParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: params.first_name,
            last_name: params.last_name,
            group_id: params.group_id.unwrap_or_default(),
            attending: params.attending,
            guests: params.guests,
            email: params.email,
            phone: params.phone,
            diet: params.diet,
            message: params.message,
            created_at: Utc::now(),
        }
    }

    /// Party row: attendance and headcount only, no contact details.
    pub fn for_member(first_name: String, last_name: String, group_id: &str, attending: bool, guests: i32) -> Self {
        Self::new(NewRsvpParams {
            first_name,
            last_name,
            group_id: Some(group_id.to_string()),
            attending,
            guests,
            email: None,
            phone: None,
            diet: None,
            message: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn group(&self) -> Option<&str> {
        if self.group_id.is_empty() { None } else { Some(&self.group_id) }
    }
}

/// How the `guests` column is filled.
///
/// `PerAttendee` writes 1 for every attending row and 0 otherwise.
/// `Declared` writes the submitter's own "total including you" figure on their row and
/// 0 on the other party rows, since that total already covers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestCountPolicy {
    #[default]
    PerAttendee,
    Declared,
}

impl GuestCountPolicy {
    pub fn submitter_guests(&self, attending: bool, declared: Option<i32>) -> i32 {
        match self {
            GuestCountPolicy::PerAttendee => i32::from(attending),
            GuestCountPolicy::Declared => declared.unwrap_or(1).max(0),
        }
    }

    pub fn member_guests(&self, attending: bool) -> i32 {
        match self {
            GuestCountPolicy::PerAttendee => i32::from(attending),
            GuestCountPolicy::Declared => 0,
        }
    }
}

impl FromStr for GuestCountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_attendee" | "per-attendee" => Ok(GuestCountPolicy::PerAttendee),
            "declared" => Ok(GuestCountPolicy::Declared),
            other => Err(format!("unknown guest count policy '{}'", other)),
        }
    }
}
