mod common;

use common::TestApp;
use wedding_rsvp::domain::models::{
    group_lock::LockOutcome,
    guest::PartyMember,
    rsvp::{NewRsvpParams, Rsvp},
};
use wedding_rsvp::domain::services::admin_accounts::{ensure_admin, AccountChange};
use wedding_rsvp::domain::services::selection::Selection;

fn detail(first: &str, group: Option<&str>, attending: bool) -> Rsvp {
    Rsvp::new(NewRsvpParams {
        first_name: first.into(),
        last_name: "Lovelace".into(),
        group_id: group.map(str::to_string),
        attending,
        guests: i32::from(attending),
        email: Some(format!("{}@example.com", first.to_lowercase())),
        phone: None,
        diet: None,
        message: None,
    })
}

#[tokio::test]
async fn test_conflict_key_keeps_one_row_with_latest_value() {
    let app = TestApp::new().await;
    let repo = &app.state.rsvp_repo;

    let first = repo.upsert_party(&[Rsvp::for_member("Ada".into(), "Lovelace".into(), "g7", true, 1)]).await.unwrap();
    let second = repo.upsert_party(&[Rsvp::for_member("Ada".into(), "Lovelace".into(), "g7", false, 0)]).await.unwrap();

    assert_eq!(first[0].id, second[0].id);
    let rows = repo.list_by_group("g7").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].attending);
    assert_eq!(rows[0].guests, 0);
}

#[tokio::test]
async fn test_repeat_submission_keeps_id_and_takes_latest_answer() {
    let app = TestApp::new().await;
    let repo = &app.state.rsvp_repo;

    let created = repo.save_submission(&detail("Ada", None, true), &[]).await.unwrap();
    assert!(!created.duplicate);

    let mut changed = detail("Ada", None, false);
    changed.diet = Some("vegan".into());
    let again = repo.save_submission(&changed, &[]).await.unwrap();
    assert!(again.duplicate);
    assert_eq!(again.record.id, created.record.id);
    assert!(!again.record.attending);
    assert_eq!(again.record.diet.as_deref(), Some("vegan"));

    let stored = repo.find_by_id(&created.record.id).await.unwrap().unwrap();
    assert!(!stored.attending);
    assert_eq!(stored.diet.as_deref(), Some("vegan"));

    // Same person, different group: a separate row.
    let other = repo.save_submission(&detail("Ada", Some("g7"), true), &[]).await.unwrap();
    assert!(!other.duplicate);
    assert_ne!(other.record.id, created.record.id);
    assert_eq!(app.rsvp_count().await, 2);
}

#[tokio::test]
async fn test_partyless_key_ignores_letter_case() {
    let app = TestApp::new().await;
    let repo = &app.state.rsvp_repo;

    let created = repo.save_submission(&detail("Ada", None, true), &[]).await.unwrap();

    let mut shouted = detail("ADA", None, false);
    shouted.last_name = "LOVELACE".into();
    let again = repo.save_submission(&shouted, &[]).await.unwrap();

    assert!(again.duplicate);
    assert_eq!(again.record.id, created.record.id);
    assert_eq!(app.rsvp_count().await, 1);
}

#[tokio::test]
async fn test_submission_writes_detail_and_party_together() {
    let app = TestApp::new().await;
    let repo = &app.state.rsvp_repo;

    let ada = detail("Ada", Some("g7"), true);
    let party = vec![
        Rsvp { guests: 1, ..ada.clone() },
        Rsvp::for_member("Bea".into(), "Lovelace".into(), "g7", true, 1),
    ];
    let saved = repo.save_submission(&ada, &party).await.unwrap();

    assert_eq!(saved.party.len(), 2);
    assert_eq!(saved.record.id, ada.id);
    assert_eq!(saved.record.email.as_deref(), Some("ada@example.com"));
    assert_eq!(app.rsvps_in_group("g7").await.len(), 2);
}

#[tokio::test]
async fn test_failed_party_write_leaves_nothing_behind() {
    let app = TestApp::new().await;
    let repo = &app.state.rsvp_repo;
    sqlx::query("CREATE TRIGGER reject_bea BEFORE INSERT ON rsvps WHEN NEW.first_name = 'Bea' BEGIN SELECT RAISE(ABORT, 'party write rejected'); END;")
        .execute(&app.pool)
        .await
        .unwrap();

    let ada = detail("Ada", Some("g7"), true);
    let party = vec![
        ada.clone(),
        Rsvp::for_member("Bea".into(), "Lovelace".into(), "g7", true, 1),
    ];
    let err = repo.save_submission(&ada, &party).await.unwrap_err();

    assert!(err.to_string().contains("party write rejected"));
    assert_eq!(app.rsvp_count().await, 0);
}

#[tokio::test]
async fn test_party_upsert_keeps_contact_details() {
    let app = TestApp::new().await;
    let repo = &app.state.rsvp_repo;

    let created = repo.save_submission(&detail("Ada", Some("g7"), true), &[]).await.unwrap().record;
    repo.upsert_party(&[Rsvp::for_member("Ada".into(), "Lovelace".into(), "g7", false, 0)]).await.unwrap();

    let stored = repo.find_by_id(&created.id).await.unwrap().unwrap();
    assert!(!stored.attending);
    assert_eq!(stored.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_lock_is_acquired_once() {
    let app = TestApp::new().await;
    let service = &app.state.rsvp_service;

    assert_eq!(service.try_lock("g7").await.unwrap(), LockOutcome::Acquired);
    assert_eq!(service.try_lock("g7").await.unwrap(), LockOutcome::AlreadyLocked);
    assert!(service.is_locked("g7").await.unwrap());
    assert!(!service.is_locked("g8").await.unwrap());

    assert!(app.state.lock_repo.release("g7").await.unwrap());
    assert!(!app.state.lock_repo.release("g7").await.unwrap());
    assert_eq!(service.try_lock("g7").await.unwrap(), LockOutcome::Acquired);
}

#[tokio::test]
async fn test_save_party_follows_each_selection() {
    let app = TestApp::new().await;
    let service = &app.state.rsvp_service;
    let members = vec![PartyMember::new("Ada", "Lovelace"), PartyMember::new("Bea", "Lovelace")];

    let mut selection = Selection::for_members(&members);
    selection.set("Ada Lovelace", true);
    selection.set("Bea Lovelace", true);
    service.save_party("g7", &members, &selection).await.unwrap();

    selection.toggle("Bea Lovelace");
    service.save_party("g7", &members, &selection).await.unwrap();

    let rows = app.rsvps_in_group("g7").await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().find(|r| r.first_name == "Ada").unwrap().attending);
    assert!(!rows.iter().find(|r| r.first_name == "Bea").unwrap().attending);
}

#[tokio::test]
async fn test_directory_prefers_grouped_entry() {
    let app = TestApp::new().await;
    app.seed_guest("Ada", "Lovelace", None).await;
    app.seed_guest("Ada", "Lovelace", Some("g7")).await;

    let resolver = app.state.rsvp_service.resolver();
    assert_eq!(resolver.resolve_group("ADA", "lovelace").await.unwrap().as_deref(), Some("g7"));
    assert_eq!(resolver.resolve_group("  ", "Lovelace").await.unwrap(), None);
}

#[tokio::test]
async fn test_ensure_admin_creates_then_resets() {
    let app = TestApp::new().await;

    let (created, change) = ensure_admin(&app.state.admin_repo, &app.state.session_repo, "Couple@Example.com", "first-password").await.unwrap();
    assert_eq!(change, AccountChange::Created);
    assert_eq!(created.email, "couple@example.com");

    let (updated, change) = ensure_admin(&app.state.admin_repo, &app.state.session_repo, "couple@example.com", "second-password").await.unwrap();
    assert_eq!(change, AccountChange::PasswordUpdated);
    assert_eq!(updated.id, created.id);
    assert_ne!(updated.password_hash, created.password_hash);

    app.login("couple@example.com", "second-password").await;
}
