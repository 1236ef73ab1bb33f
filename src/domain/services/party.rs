use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::models::guest::PartyMember;
use crate::domain::ports::{GuestRepository, RsvpRepository};
use crate::domain::services::deadline::with_deadline;
use crate::domain::services::names::{name_key, sanitize_first_name, sanitize_last_name};
use crate::domain::services::selection::Selection;
use crate::error::AppError;

/// A resolved household with the attendance checkboxes pre-filled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub group_id: String,
    pub members: Vec<PartyMember>,
    pub initial_attendance: Selection,
}

impl Party {
    /// Directory spelling of a typed name, if that person belongs to the party.
    pub fn member(&self, first_name: &str, last_name: &str) -> Option<&PartyMember> {
        self.members.iter().find(|m| m.matches(first_name, last_name))
    }
}

pub struct PartyResolver {
    guest_repo: Arc<dyn GuestRepository>,
    rsvp_repo: Arc<dyn RsvpRepository>,
    store_timeout: Duration,
}

impl PartyResolver {
    pub fn new(guest_repo: Arc<dyn GuestRepository>, rsvp_repo: Arc<dyn RsvpRepository>, store_timeout: Duration) -> Self {
        Self { guest_repo, rsvp_repo, store_timeout }
    }

    /// Directory lookup. A guest without a group id counts as not found.
    pub async fn resolve_group(&self, first_name: &str, last_name: &str) -> Result<Option<String>, AppError> {
        let first = sanitize_first_name(first_name);
        let last = sanitize_last_name(last_name);
        if first.is_empty() || last.is_empty() {
            return Ok(None);
        }

        let guest = with_deadline(self.store_timeout, "guest lookup", self.guest_repo.find_by_name(&first, &last)).await?;

        Ok(guest
            .and_then(|g| g.group_id)
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty()))
    }

    /// Loads the members of `group_id` and pre-checks the submitter plus everyone who
    /// already confirmed. Returns `None` when the directory has nobody in that group.
    pub async fn load_party(&self, group_id: &str, submitter_first: &str, submitter_last: &str) -> Result<Option<Party>, AppError> {
        let guests = with_deadline(self.store_timeout, "party lookup", self.guest_repo.list_by_group(group_id)).await?;
        if guests.is_empty() {
            return Ok(None);
        }

        let mut members: Vec<PartyMember> = guests.iter().map(PartyMember::from).collect();
        members.sort_by(|a, b| {
            a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase())
                .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
        });

        let existing = with_deadline(self.store_timeout, "party attendance lookup", self.rsvp_repo.list_by_group(group_id)).await?;
        let confirmed: HashSet<String> = existing
            .iter()
            .filter(|r| r.attending)
            .map(|r| name_key(&r.first_name, &r.last_name))
            .collect();

        let submitter = name_key(&sanitize_first_name(submitter_first), &sanitize_last_name(submitter_last));

        let mut initial_attendance = Selection::for_members(&members);
        for member in &members {
            let key = name_key(&member.first_name, &member.last_name);
            if key == submitter || confirmed.contains(&key) {
                initial_attendance.set(&member.full_name(), true);
            }
        }

        debug!("Loaded party {} with {} members ({} pre-checked)", group_id, members.len(), initial_attendance.selected_count());

        Ok(Some(Party {
            group_id: group_id.to_string(),
            members,
            initial_attendance,
        }))
    }

    /// Name to party in one step. Store failures are logged and read as "no party" so the
    /// caller never renders partial state.
    pub async fn lookup(&self, first_name: &str, last_name: &str) -> Option<Party> {
        let result = async {
            match self.resolve_group(first_name, last_name).await? {
                Some(group_id) => self.load_party(&group_id, first_name, last_name).await,
                None => Ok(None),
            }
        }
        .await;

        match result {
            Ok(party) => party,
            Err(e) => {
                warn!("Party lookup failed, continuing without party: {}", e);
                None
            }
        }
    }
}
