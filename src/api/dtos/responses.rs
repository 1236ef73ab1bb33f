use std::collections::BTreeMap;
use serde::Serialize;

use crate::domain::models::rsvp::Rsvp;
use crate::domain::services::notification::EmailSummary;
use crate::domain::services::party::Party;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRsvpResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub duplicate: bool,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub party_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSummary>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PartyResponse {
    pub found: bool,
    pub group_id: Option<String>,
    pub locked: bool,
    pub members: Vec<MemberView>,
    pub attendance: BTreeMap<String, bool>,
    pub selected_count: usize,
}

impl PartyResponse {
    pub fn not_found() -> Self {
        Self {
            found: false,
            group_id: None,
            locked: false,
            members: Vec::new(),
            attendance: BTreeMap::new(),
            selected_count: 0,
        }
    }

    pub fn from_party(party: Party, locked: bool) -> Self {
        let members = party.members.iter().map(|m| MemberView {
            first_name: m.first_name.clone(),
            last_name: m.last_name.clone(),
            full_name: m.full_name(),
        }).collect();

        Self {
            found: true,
            group_id: Some(party.group_id),
            locked,
            members,
            selected_count: party.initial_attendance.selected_count(),
            attendance: party.initial_attendance.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RsvpListResponse {
    pub total: usize,
    pub rsvps: Vec<Rsvp>,
}

#[derive(Serialize, Debug)]
pub struct LockReleasedResponse {
    pub group_id: String,
    pub released: bool,
}
