use std::{collections::BTreeSet, fs};

use tempfile::tempdir;
use tripflow_core::progress::ProgressStore;
use tripflow_domain::{BookingId, WizardStep};
use tripflow_storage_json::JsonProgressStore;

#[test]
fn json_store_round_trips_progress() {
    let dir = tempdir().expect("tempdir");
    let store = JsonProgressStore::new(dir.path().join("progress")).expect("create store");
    let id = BookingId::from("B-1001");
    let completed = BTreeSet::from([WizardStep::One, WizardStep::Two]);

    store.save(&id, WizardStep::Two, &completed).expect("save");
    let loaded = store.load(&id);

    assert_eq!(loaded.current_step, WizardStep::Two);
    assert_eq!(loaded.completed_steps, completed);
    let path = store.progress_path(&id);
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert_eq!(
        fs::read_to_string(&path).expect("read blob"),
        r#"{"currentStep":2,"completedSteps":[1,2]}"#
    );
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn missing_and_corrupt_files_load_fresh() {
    let dir = tempdir().expect("tempdir");
    let store = JsonProgressStore::new(dir.path().to_path_buf()).expect("create store");
    let id = BookingId::from(77_i64);

    assert!(store.load(&id).is_fresh());

    fs::write(store.progress_path(&id), "{\"currentStep\":").expect("write corrupt");
    assert!(store.load(&id).is_fresh());

    fs::write(
        store.progress_path(&id),
        r#"{"currentStep":9,"completedSteps":[1]}"#,
    )
    .expect("write out of range");
    assert!(store.load(&id).is_fresh());
}

#[test]
fn clear_removes_only_the_given_booking() {
    let dir = tempdir().expect("tempdir");
    let store = JsonProgressStore::new(dir.path().to_path_buf()).expect("create store");
    let first = BookingId::from("a-1");
    let second = BookingId::from("a-2");
    let completed = BTreeSet::from([WizardStep::One]);

    store.save(&first, WizardStep::Two, &completed).expect("save first");
    store.save(&second, WizardStep::Two, &completed).expect("save second");
    store.clear(&first).expect("clear");
    store.clear(&first).expect("clear twice");

    assert!(store.load(&first).is_fresh());
    assert_eq!(store.load(&second).current_step, WizardStep::Two);
    assert_eq!(
        store.list_keys().expect("list keys"),
        vec!["booking-wizard-progress-a-2".to_string()]
    );
}

#[test]
fn prefix_separates_stores_sharing_a_directory() {
    let dir = tempdir().expect("tempdir");
    let default = JsonProgressStore::new(dir.path().to_path_buf()).expect("default store");
    let custom =
        JsonProgressStore::with_prefix(dir.path().to_path_buf(), "trip-").expect("custom store");
    let id = BookingId::from("shared");

    default
        .save(&id, WizardStep::Three, &BTreeSet::from([WizardStep::One, WizardStep::Two]))
        .expect("save");

    assert!(custom.load(&id).is_fresh());
    assert_eq!(default.load(&id).current_step, WizardStep::Three);
}

#[test]
fn last_write_wins() {
    let dir = tempdir().expect("tempdir");
    let store = JsonProgressStore::new(dir.path().to_path_buf()).expect("create store");
    let id = BookingId::from("b-5");

    store
        .save(&id, WizardStep::Two, &BTreeSet::from([WizardStep::One]))
        .expect("first save");
    store
        .save(&id, WizardStep::One, &BTreeSet::new())
        .expect("second save");

    assert!(store.load(&id).is_fresh());
}

#[test]
fn ids_differing_in_case_or_punctuation_keep_separate_progress() {
    let dir = tempdir().expect("tempdir");
    let store = JsonProgressStore::new(dir.path().to_path_buf()).expect("create store");
    let completed = BTreeSet::from([WizardStep::One, WizardStep::Two]);

    store
        .save(&BookingId::from("AB-1"), WizardStep::Three, &completed)
        .expect("save upper");
    store
        .save(&BookingId::from("b.1"), WizardStep::Two, &BTreeSet::from([WizardStep::One]))
        .expect("save dotted");

    assert!(store.load(&BookingId::from("ab-1")).is_fresh());
    assert!(store.load(&BookingId::from("b_1")).is_fresh());
    assert_eq!(store.load(&BookingId::from("AB-1")).current_step, WizardStep::Three);

    store.clear(&BookingId::from("ab-1")).expect("clear lower");
    assert_eq!(
        store.load(&BookingId::from("AB-1")).completed_steps,
        completed
    );
    assert_eq!(store.list_keys().expect("list keys").len(), 2);
}
