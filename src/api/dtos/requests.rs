use serde::Deserialize;

use crate::domain::services::names::non_blank;
use crate::domain::services::rsvp_service::{RsvpSubmission, MISSING_FIELDS};
use crate::error::AppError;

/// `attending` arrives either as a JSON boolean or as a "yes"/"no" style string.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum AttendingField {
    Flag(bool),
    Text(String),
}

impl AttendingField {
    pub fn as_bool(&self) -> bool {
        match self {
            AttendingField::Flag(b) => *b,
            AttendingField::Text(s) => !matches!(s.trim().to_lowercase().as_str(), "no" | "false" | "0" | "n"),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRsvpRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub attending: Option<AttendingField>,
    #[serde(alias = "guestsCount")]
    pub guests: Option<i32>,
    pub diet: Option<String>,
    pub message: Option<String>,
    pub group_id: Option<String>,
    #[serde(default)]
    pub selected_list: Vec<String>,
}

impl SubmitRsvpRequest {
    /// Checks the required fields and normalizes the optional ones. Nothing touches the
    /// store before this passes.
    pub fn into_submission(self) -> Result<RsvpSubmission, AppError> {
        let (Some(first_name), Some(last_name), Some(email)) = (
            non_blank(self.first_name.as_deref()),
            non_blank(self.last_name.as_deref()),
            non_blank(self.email.as_deref()),
        ) else {
            return Err(AppError::Validation(MISSING_FIELDS.into()));
        };

        if let Some(guests) = self.guests
            && guests < 0 {
            return Err(AppError::Validation("Guest count cannot be negative.".into()));
        }

        Ok(RsvpSubmission {
            first_name,
            last_name,
            email,
            phone: non_blank(self.phone.as_deref()),
            // An absent answer counts as a yes.
            attending: self.attending.map(|a| a.as_bool()).unwrap_or(true),
            guests: self.guests,
            diet: non_blank(self.diet.as_deref()),
            message: non_blank(self.message.as_deref()),
            group_id: non_blank(self.group_id.as_deref()),
            selected_list: self.selected_list.into_iter().filter(|n| !n.trim().is_empty()).collect(),
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PartyQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginPageQuery {
    pub redirect: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RsvpListQuery {
    pub q: Option<String>,
    pub group: Option<String>,
}

/// Missing `attending` flips the stored value.
#[derive(Deserialize, Debug, Default)]
pub struct UpdateRsvpRequest {
    pub attending: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ChangesQuery {
    pub table: String,
}
