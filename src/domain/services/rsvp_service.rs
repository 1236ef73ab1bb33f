use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Span};

use crate::domain::models::{
    change::{ChangeEvent, ChangeKind, TABLE_GROUP_LOCKS, TABLE_RSVPS},
    group_lock::{GroupLock, LockOutcome},
    guest::PartyMember,
    rsvp::{GuestCountPolicy, NewRsvpParams, Rsvp},
};
use crate::domain::ports::{ChangeFeed, GroupLockRepository, RsvpRepository, SavedSubmission};
use crate::domain::services::deadline::with_deadline;
use crate::domain::services::names::{name_key, sanitize_first_name, sanitize_last_name};
use crate::domain::services::notification::{NotificationDispatcher, NotificationReport};
use crate::domain::services::party::{Party, PartyResolver};
use crate::domain::services::selection::Selection;
use crate::error::AppError;

pub const MISSING_FIELDS: &str = "Missing required fields.";

/// A submission that already passed boundary validation.
#[derive(Debug, Clone)]
pub struct RsvpSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub attending: bool,
    pub guests: Option<i32>,
    pub diet: Option<String>,
    pub message: Option<String>,
    pub group_id: Option<String>,
    pub selected_list: Vec<String>,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The group already submitted; nothing was written or sent.
    Locked { group_id: String },
    Saved {
        record: Rsvp,
        duplicate: bool,
        party: Vec<Rsvp>,
        notifications: NotificationReport,
    },
}

pub struct RsvpSettings {
    pub policy: GuestCountPolicy,
    pub lock_groups: bool,
    pub store_timeout: Duration,
}

pub struct RsvpService {
    resolver: PartyResolver,
    rsvp_repo: Arc<dyn RsvpRepository>,
    lock_repo: Arc<dyn GroupLockRepository>,
    change_feed: Arc<dyn ChangeFeed>,
    dispatcher: NotificationDispatcher,
    settings: RsvpSettings,
}

impl RsvpService {
    pub fn new(
        resolver: PartyResolver,
        rsvp_repo: Arc<dyn RsvpRepository>,
        lock_repo: Arc<dyn GroupLockRepository>,
        change_feed: Arc<dyn ChangeFeed>,
        dispatcher: NotificationDispatcher,
        settings: RsvpSettings,
    ) -> Self {
        Self { resolver, rsvp_repo, lock_repo, change_feed, dispatcher, settings }
    }

    pub fn resolver(&self) -> &PartyResolver {
        &self.resolver
    }

    /// Check-and-set in one conditional insert.
    pub async fn try_lock(&self, group_id: &str) -> Result<LockOutcome, AppError> {
        let outcome = with_deadline(self.settings.store_timeout, "group lock", self.lock_repo.try_lock(group_id)).await?;
        match outcome {
            LockOutcome::Acquired => {
                info!("Group {} locked", group_id);
                self.publish(ChangeEvent::new(TABLE_GROUP_LOCKS, ChangeKind::Insert, &GroupLock::new(group_id.to_string()))).await;
            }
            LockOutcome::AlreadyLocked => info!("Group {} already submitted", group_id),
        }
        Ok(outcome)
    }

    pub async fn is_locked(&self, group_id: &str) -> Result<bool, AppError> {
        with_deadline(self.settings.store_timeout, "group lock check", self.lock_repo.is_locked(group_id)).await
    }

    /// Writes one row per member: attending from `selection`, headcount per the policy.
    pub async fn save_party(&self, group_id: &str, members: &[PartyMember], selection: &Selection) -> Result<Vec<Rsvp>, AppError> {
        let rows = self.party_rows(group_id, members, selection);
        self.write_party(rows).await
    }

    /// Full public flow: lock, one transactional write of the detail and party rows,
    /// then notifications. A failed write leaves no rows and no lock behind.
    pub async fn submit(&self, submission: RsvpSubmission) -> Result<SubmissionOutcome, AppError> {
        let first_name = sanitize_first_name(&submission.first_name);
        let last_name = sanitize_last_name(&submission.last_name);
        if first_name.is_empty() || last_name.is_empty() || submission.email.trim().is_empty() {
            return Err(AppError::Validation(MISSING_FIELDS.into()));
        }

        let group_id = match submission.group_id.clone() {
            Some(group_id) => Some(group_id),
            None => self.resolver.resolve_group(&first_name, &last_name).await?,
        };
        if let Some(group_id) = &group_id {
            Span::current().record("group_id", group_id.as_str());
        }

        let party = match &group_id {
            Some(group_id) => self.resolver.load_party(group_id, &first_name, &last_name).await?,
            None => None,
        };

        // Directory spelling wins so the conflict key lines up with the party rows.
        let (first_name, last_name) = match party.as_ref().and_then(|p| p.member(&first_name, &last_name)) {
            Some(member) => (member.first_name.clone(), member.last_name.clone()),
            None => (first_name, last_name),
        };

        let mut locked_group = None;
        if let Some(party) = &party
            && self.settings.lock_groups {
            match self.try_lock(&party.group_id).await? {
                LockOutcome::AlreadyLocked => {
                    return Ok(SubmissionOutcome::Locked { group_id: party.group_id.clone() });
                }
                LockOutcome::Acquired => locked_group = Some(party.group_id.clone()),
            }
        }

        let detail = Rsvp::new(NewRsvpParams {
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            group_id: group_id.clone(),
            attending: submission.attending,
            guests: self.settings.policy.submitter_guests(submission.attending, submission.guests),
            email: Some(submission.email.trim().to_string()),
            phone: submission.phone.clone(),
            diet: submission.diet.clone(),
            message: submission.message.clone(),
        });

        let (party_rows, family) = match &party {
            Some(party) => {
                let selection = submitted_selection(party, &first_name, &last_name, submission.attending, &submission.selected_list);
                let mut rows = self.party_rows(&party.group_id, &party.members, &selection);
                if let Some(own) = rows.iter_mut().find(|r| name_key(&r.first_name, &r.last_name) == name_key(&first_name, &last_name)) {
                    own.guests = detail.guests;
                }
                (rows, selection.selected_names())
            }
            None => (Vec::new(), submission.selected_list.clone()),
        };

        let saved = match with_deadline(
            self.settings.store_timeout,
            "rsvp save",
            self.rsvp_repo.save_submission(&detail, &party_rows),
        )
        .await
        {
            Ok(saved) => saved,
            Err(e) => {
                error!("Saving RSVP for {} {} failed: {}", first_name, last_name, e);
                self.unlock(locked_group.as_deref()).await;
                return Err(e.into_save_failure());
            }
        };

        if saved.duplicate {
            warn!("Repeat RSVP for {} in group '{}', updated {}", saved.record.full_name(), saved.record.group_id, saved.record.id);
        }
        self.publish_saved(&saved, &party_rows).await;

        // The stored row now carries this submission's answer, so mail matches what the guest sent.
        let notifications = self.dispatcher.notify(&saved.record, &family).await;

        info!("RSVP stored: {} (duplicate: {}, party rows: {})", saved.record.id, saved.duplicate, saved.party.len());

        Ok(SubmissionOutcome::Saved {
            record: saved.record,
            duplicate: saved.duplicate,
            party: saved.party,
            notifications,
        })
    }

    /// One event per stored row; rows that kept an older id were updates.
    async fn publish_saved(&self, saved: &SavedSubmission, sent: &[Rsvp]) {
        let kind = if saved.duplicate { ChangeKind::Update } else { ChangeKind::Insert };
        self.publish(ChangeEvent::new(TABLE_RSVPS, kind, &saved.record)).await;

        for row in saved.party.iter().filter(|r| r.id != saved.record.id) {
            let created = sent.iter().any(|s| s.id == row.id);
            let kind = if created { ChangeKind::Insert } else { ChangeKind::Update };
            self.publish(ChangeEvent::new(TABLE_RSVPS, kind, row)).await;
        }
    }

    fn party_rows(&self, group_id: &str, members: &[PartyMember], selection: &Selection) -> Vec<Rsvp> {
        members
            .iter()
            .map(|m| {
                let attending = selection.is_selected(&m.full_name());
                Rsvp::for_member(
                    m.first_name.clone(),
                    m.last_name.clone(),
                    group_id,
                    attending,
                    self.settings.policy.member_guests(attending),
                )
            })
            .collect()
    }

    async fn write_party(&self, rows: Vec<Rsvp>) -> Result<Vec<Rsvp>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sent_ids: HashMap<String, String> = rows.iter().map(|r| (name_key(&r.first_name, &r.last_name), r.id.clone())).collect();
        let saved = with_deadline(self.settings.store_timeout, "party upsert", self.rsvp_repo.upsert_party(&rows)).await?;

        for row in &saved {
            let created = sent_ids.get(&name_key(&row.first_name, &row.last_name)) == Some(&row.id);
            let kind = if created { ChangeKind::Insert } else { ChangeKind::Update };
            self.publish(ChangeEvent::new(TABLE_RSVPS, kind, row)).await;
        }
        Ok(saved)
    }

    async fn unlock(&self, group_id: Option<&str>) {
        let Some(group_id) = group_id else { return };
        match with_deadline(self.settings.store_timeout, "group unlock", self.lock_repo.release(group_id)).await {
            Ok(_) => warn!("Released lock for group {} after failed write", group_id),
            Err(e) => error!("Could not release lock for group {}: {}", group_id, e),
        }
    }

    async fn publish(&self, event: ChangeEvent) {
        if let Err(e) = self.change_feed.publish(event).await {
            warn!("Change feed publish failed: {}", e);
        }
    }
}

/// Final checkbox state: the submitter follows their own answer, everyone else follows
/// whether the client listed them.
fn submitted_selection(party: &Party, first_name: &str, last_name: &str, attending: bool, selected_list: &[String]) -> Selection {
    let listed: Vec<String> = selected_list.iter().map(|n| n.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()).collect();
    let own_key = name_key(first_name, last_name);

    let mut selection = party.initial_attendance.clone();
    for member in &party.members {
        let key = name_key(&member.first_name, &member.last_name);
        let value = if key == own_key { attending } else { listed.contains(&key) };
        selection.set(&member.full_name(), value);
    }
    selection
}
