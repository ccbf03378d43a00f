// Durable wizard state: file-backed round trips, per-user isolation, and
// corruption fallback. A broken persisted blob must never take the flow
// down - it degrades to a fresh wizard.

use std::sync::Arc;

use launchpad::{
    FileStore, InvitationDraft, KeyValueStore, UserId, WizardSnapshot, WizardState, WizardStorage,
};
use tempfile::TempDir;

fn file_storage() -> (TempDir, WizardStorage) {
    let dir = TempDir::new().unwrap();
    let storage = WizardStorage::new(Arc::new(FileStore::new(dir.path())));
    (dir, storage)
}

fn populated_state() -> WizardState {
    let mut state = WizardState::default();
    state.form_data.basics.name = "Acme Creative".to_string();
    state.form_data.basics.slug = "acme-creative".to_string();
    state.form_data.goals.select("instagram_management");
    state.form_data.goals.select("crm_sales");
    state.form_data.team.invitations.push(InvitationDraft {
        email: "ren@example.com".to_string(),
        role: "editor".to_string(),
        department: Some("content".to_string()),
        message: None,
    });
    state.next_step();
    state.next_step();
    state
}

#[test]
fn test_file_round_trip_reproduces_state() {
    let (_dir, storage) = file_storage();
    let state = populated_state();
    let user = UserId::new("u1");

    storage.save(&user, &state).unwrap();
    let recovered = storage.load(&user).unwrap();

    assert_eq!(recovered.current_step, state.current_step);
    assert_eq!(recovered.completed_steps, state.completed_steps);
    assert_eq!(recovered.form_data, state.form_data);
}

#[test]
fn test_snapshot_serialization_is_idempotent() {
    let snapshot = populated_state().snapshot();
    let first = serde_json::to_string(&snapshot).unwrap();
    let reparsed: WizardSnapshot = serde_json::from_str(&first).unwrap();
    assert_eq!(reparsed, snapshot);
    let second = serde_json::to_string(&reparsed).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_corrupt_file_degrades_to_fresh_state() {
    let (dir, storage) = file_storage();
    let user = UserId::new("u1");
    storage.save(&user, &populated_state()).unwrap();

    // clobber the record on disk
    let record = dir.path().join("wizard-u1.json");
    std::fs::write(&record, "{\"version\": \"1\", \"current_step\": ").unwrap();

    assert!(storage.load(&user).is_none());
}

#[test]
fn test_truncated_record_does_not_panic_on_load() {
    let (dir, storage) = file_storage();
    let user = UserId::new("u1");
    storage.save(&user, &populated_state()).unwrap();

    let record = dir.path().join("wizard-u1.json");
    let contents = std::fs::read_to_string(&record).unwrap();
    std::fs::write(&record, &contents[..contents.len() / 2]).unwrap();

    assert!(storage.load(&user).is_none());
}

#[test]
fn test_users_never_see_each_other() {
    let (_dir, storage) = file_storage();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    storage.save(&alice, &populated_state()).unwrap();

    assert!(storage.load(&bob).is_none());
    let mut bob_state = WizardState::default();
    bob_state.form_data.basics.name = "Bob's Shop".to_string();
    storage.save(&bob, &bob_state).unwrap();

    assert_eq!(storage.load(&alice).unwrap().form_data.basics.name, "Acme Creative");
    assert_eq!(storage.load(&bob).unwrap().form_data.basics.name, "Bob's Shop");
}

#[test]
fn test_unusual_user_ids_map_to_distinct_keys() {
    let (_dir, storage) = file_storage();
    let oauth_user = UserId::new("auth0|abc/123");
    storage.save(&oauth_user, &populated_state()).unwrap();
    assert!(storage.load(&oauth_user).is_some());
    assert!(storage.load(&UserId::new("auth0|abc/456")).is_none());
}

#[test]
fn test_clear_erases_the_durable_record() {
    let (dir, storage) = file_storage();
    let user = UserId::new("u1");
    storage.save(&user, &populated_state()).unwrap();
    storage.clear(&user).unwrap();

    assert!(storage.load(&user).is_none());
    assert!(!dir.path().join("wizard-u1.json").exists());
}

#[test]
fn test_clear_of_absent_record_is_a_noop() {
    let (_dir, storage) = file_storage();
    storage.clear(&UserId::new("nobody")).unwrap();
}

#[test]
fn test_file_store_get_of_missing_key_is_none() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    assert!(store.get("missing").unwrap().is_none());
}
