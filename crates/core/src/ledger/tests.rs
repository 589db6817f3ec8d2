// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use crate::AssetKind;

use super::*;

fn marker_record(id: &str) -> AssetRecord {
    AssetRecord::from_response(AssetKind::Marker, json!({ "marker_id": id })).unwrap()
}

#[test]
fn sidecar_replaces_extension() {
    assert_eq!(
        Path::new("markers/pin.json"),
        sidecar_file_path(Path::new("markers/pin.png"))
    );
}

#[test]
fn store_then_load() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("pin.png");
    fs::write(&file_path, b"png").unwrap();
    let ledger = AssetLedger::new();
    assert!(!ledger.has(&file_path));
    assert_eq!(AssetState::NotUploaded, ledger.lookup(&file_path));

    let record = marker_record("m1");
    ledger.store(&file_path, &record).unwrap();

    assert!(dir.path().join("pin.json").is_file());
    assert!(ledger.has(&file_path));
    assert_eq!(Some(record), ledger.load(&file_path));
}

#[test]
fn store_leaves_no_temporary_files_behind() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("pin.png");
    AssetLedger::new()
        .store(&file_path, &marker_record("m1"))
        .unwrap();
    let file_names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(vec![std::ffi::OsString::from("pin.json")], file_names);
}

#[test]
fn corrupt_sidecar_is_not_uploaded() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("pin.png");
    // Truncated JSON as left behind by an interrupted write
    fs::write(dir.path().join("pin.json"), br#"{"marker_id": "m"#).unwrap();
    let ledger = AssetLedger::new();
    assert_eq!(AssetState::NotUploaded, ledger.lookup(&file_path));
    assert!(ledger.load(&file_path).is_none());
}

#[test]
fn sidecar_without_identifier_is_not_uploaded() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("pin.png");
    fs::write(dir.path().join("pin.json"), br#"{"error": "quota"}"#).unwrap();
    assert!(!AssetLedger::new().has(&file_path));
}
