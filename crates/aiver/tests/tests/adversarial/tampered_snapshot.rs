//! Adversarial test: snapshots edited in transit are caught on import.

use aiver_ledger::{LedgerConfig, LedgerError, LedgerReader, LedgerSnapshot, LedgerStore};
use aiver_ledger_tests::lineage_store;
use serde_json::Value;

fn exported_json() -> Value {
    let (store, _) = lineage_store().unwrap();
    serde_json::to_value(store.snapshot().unwrap()).unwrap()
}

fn import(value: Value, audit: bool) -> Result<LedgerStore, LedgerError> {
    let snap: LedgerSnapshot = serde_json::from_value(value).unwrap();
    let config = LedgerConfig {
        audit_on_load: audit,
        ..LedgerConfig::default()
    };
    LedgerStore::from_snapshot(config, snap)
}

#[test]
fn edited_regulation_is_rejected() {
    let mut json = exported_json();
    json["nodes"][2]["metadata"]["regulations"] = Value::from("Regulation Z");
    assert!(matches!(
        import(json, true),
        Err(LedgerError::SnapshotRejected(_))
    ));
}

#[test]
fn edited_expiration_date_is_rejected() {
    let mut json = exported_json();
    json["nodes"][0]["metadata"]["expiration_date"] = Value::from("2099-01-01");
    assert!(matches!(
        import(json, true),
        Err(LedgerError::SnapshotRejected(_))
    ));
}

#[test]
fn edited_timestamp_is_rejected() {
    let mut json = exported_json();
    json["nodes"][4]["created_at"] = Value::from("2030-01-01T00:00:00Z");
    assert!(matches!(
        import(json, true),
        Err(LedgerError::SnapshotRejected(_))
    ));
}

#[test]
fn unaudited_import_surfaces_tampering_in_integrity_report() {
    let mut json = exported_json();
    json["nodes"][1]["metadata"]["version"] = Value::from("9.9");
    let store = import(json, false).unwrap();

    let report = store.verify_integrity().unwrap();
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("content digest"));
    assert!(report.checks_passed < report.checks_performed);
}

#[test]
fn blank_identity_fails_to_deserialize() {
    let mut json = exported_json();
    json["nodes"][0]["metadata"]["identity_name"] = Value::from("   ");
    assert!(serde_json::from_value::<LedgerSnapshot>(json).is_err());
}

#[test]
fn malformed_digest_hex_fails_to_deserialize() {
    let mut json = exported_json();
    json["nodes"][0]["digest"] = Value::from("not-hex");
    assert!(serde_json::from_value::<LedgerSnapshot>(json).is_err());
}

#[test]
fn untampered_export_is_accepted() {
    let store = import(exported_json(), true).unwrap();
    assert_eq!(store.len().unwrap(), 5);
}
