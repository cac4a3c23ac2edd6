use std::fs;

use cuotas_core::{CoreError, MemberStore};
use cuotas_domain::{MemberDraft, MonthKey, PaymentDraft, Roster};
use cuotas_storage_json::{JsonRosterStorage, StoragePaths};
use tempfile::tempdir;

fn draft(name: &str) -> MemberDraft {
    MemberDraft {
        full_name: name.into(),
        start_date: "2024-01-01".into(),
        end_date: None,
    }
}

fn payment(owner_id: i64, month: &str) -> PaymentDraft {
    PaymentDraft {
        owner_id,
        month: month.parse::<MonthKey>().expect("month"),
        amount: "15.00".into(),
    }
}

#[test]
fn mutations_are_persisted_and_reloaded() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().join("data"));

    let mut storage = JsonRosterStorage::open(paths.clone()).expect("open");
    let member = storage.insert_member(draft("Ana Ruiz")).expect("insert");
    storage
        .insert_payment(payment(member.id, "2024-02"))
        .expect("pay");
    assert!(storage.roster_path().exists());

    let reopened = JsonRosterStorage::open(paths).expect("reopen");
    assert_eq!(reopened.list_members().expect("members").len(), 1);
    let payments = reopened.payments_for(member.id).expect("payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].timestamp, "2024-02");
    assert_eq!(reopened.roster().next_payment_id, 2);
}

#[test]
fn failed_mutations_leave_disk_and_memory_untouched() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().to_path_buf());
    let mut storage = JsonRosterStorage::open(paths).expect("open");
    storage.insert_member(draft("Ana Ruiz")).expect("insert");
    let before = fs::read_to_string(storage.roster_path()).expect("read");

    let err = storage
        .insert_payment(payment(99, "2024-02"))
        .expect_err("unknown member");
    assert!(matches!(err, CoreError::MemberNotFound(99)));
    assert!(storage.list_payments().expect("payments").is_empty());
    assert_eq!(fs::read_to_string(storage.roster_path()).expect("read"), before);
}

#[test]
fn every_save_backs_up_the_previous_file_within_retention() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().to_path_buf());
    let mut storage = JsonRosterStorage::with_retention(paths, 3).expect("open");

    for idx in 0..6 {
        storage
            .insert_member(draft(&format!("Socio {idx}")))
            .expect("insert");
    }

    let backups = storage.list_backups().expect("list");
    assert!(!backups.is_empty());
    assert!(backups.len() <= 3);
    assert!(backups.iter().all(|backup| backup.created_at.is_some()));
}

#[test]
fn restore_brings_back_a_snapshot() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().to_path_buf());
    let mut storage = JsonRosterStorage::open(paths).expect("open");
    let kept = storage.insert_member(draft("Ana Ruiz")).expect("insert");

    let snapshot = storage.backup(Some("antes de borrar")).expect("backup");
    assert!(snapshot.name.ends_with("_antes-de-borrar.json"));
    assert!(snapshot.size_bytes > 0);

    storage.delete_member(kept.id).expect("delete");
    assert!(storage.list_members().expect("members").is_empty());

    let restored = storage.restore(&snapshot.name).expect("restore");
    assert_eq!(restored.members.len(), 1);
    assert_eq!(storage.member(kept.id).expect("member").full_name, "Ana Ruiz");

    assert!(matches!(
        storage.restore("roster_missing.json"),
        Err(CoreError::Storage(_))
    ));
}

#[test]
fn newer_schema_files_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().to_path_buf());
    let mut roster = Roster::default();
    roster.schema_version = 99;
    fs::create_dir_all(&paths.data_root).expect("mkdir");
    fs::write(
        paths.data_root.join("roster.json"),
        serde_json::to_string(&roster).expect("json"),
    )
    .expect("write");

    assert!(matches!(
        JsonRosterStorage::open(paths),
        Err(CoreError::Storage(_))
    ));
}

#[test]
fn minimal_legacy_documents_load_with_defaults() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().to_path_buf());
    fs::create_dir_all(&paths.data_root).expect("mkdir");
    fs::write(
        paths.data_root.join("roster.json"),
        r#"{"members":[{"id":4,"full_name":"Luis","start_date":"2023-05-01"}]}"#,
    )
    .expect("write");

    let storage = JsonRosterStorage::open(paths).expect("open");
    assert_eq!(storage.roster().members.len(), 1);
    assert!(storage.roster().payments.is_empty());
    assert_eq!(storage.roster().next_member_id, 5);
}

#[test]
fn labelled_backups_outlive_automatic_retention() {
    let dir = tempdir().expect("tempdir");
    let paths = StoragePaths::under(dir.path().to_path_buf());
    let mut storage = JsonRosterStorage::with_retention(paths, 3).expect("open");
    let member = storage.insert_member(draft("Ana Ruiz")).expect("insert");
    let labelled = storage.backup(Some("cierre 2023")).expect("backup");
    assert_eq!(labelled.note.as_deref(), Some("cierre-2023"));

    for month in 1..=12 {
        storage
            .insert_payment(payment(member.id, &format!("2024-{month:02}")))
            .expect("pay");
    }

    let backups = storage.list_backups().expect("list");
    assert!(backups.iter().any(|backup| backup.name == labelled.name));
    let automatic = backups.iter().filter(|backup| backup.note.is_none()).count();
    assert!(automatic <= 3);
}
