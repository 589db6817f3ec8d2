// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::testing::{FakeWebApi, Request};

use super::*;

fn image_response(id: &str) -> Value {
    json!({
        "image_id": id,
        "width": 640,
        "height": 480,
        "tip_color": "#a0b0c0",
        "avg_color": "#102030",
    })
}

fn write_file(dir: &Path, file_name: &str) -> PathBuf {
    let file_path = dir.join(file_name);
    fs::write(&file_path, file_name.as_bytes()).unwrap();
    file_path
}

#[tokio::test]
async fn upload_sends_file_bytes_and_file_type() {
    let dir = TempDir::new().unwrap();
    let file_path = write_file(dir.path(), "big_ben.jpg");
    let api = FakeWebApi::new([Some(image_response("img-1"))]);
    let ledger = AssetLedger::new();

    let uploaded = upload_asset(&api, &ledger, AssetKind::Image, &file_path)
        .await
        .unwrap();

    assert!(matches!(uploaded, Uploaded::Completed(_)));
    assert_eq!(
        vec![Request::WithArg {
            endpoint: "image/upload".to_owned(),
            arg: json!({ "file_type": "jpg" }),
            body: Some(b"big_ben.jpg".to_vec()),
        }],
        api.requests()
    );
    assert_eq!(Some(uploaded.into_record()), ledger.load(&file_path));
}

#[tokio::test]
async fn upload_twice_sends_a_single_request() {
    let dir = TempDir::new().unwrap();
    let file_path = write_file(dir.path(), "pin.png");
    let api = FakeWebApi::new([Some(json!({ "marker_id": "m-1" }))]);
    let ledger = AssetLedger::new();

    let first = upload_asset(&api, &ledger, AssetKind::Marker, &file_path)
        .await
        .unwrap();
    let second = upload_asset(&api, &ledger, AssetKind::Marker, &file_path)
        .await
        .unwrap();

    assert_eq!(1, api.requests().len());
    assert!(matches!(first, Uploaded::Completed(_)));
    assert!(matches!(second, Uploaded::Skipped(_)));
    assert_eq!(first.record(), second.record());
}

#[tokio::test]
async fn accepted_upload_with_incomplete_metadata_is_recorded() {
    let dir = TempDir::new().unwrap();
    let file_path = write_file(dir.path(), "big_ben.jpg");
    let response = json!({
        "image_id": "img-1",
        "width": 640,
        "height": 480,
        "tip_color": null,
    });
    let api = FakeWebApi::new([Some(response.clone()), Some(response)]);
    let ledger = AssetLedger::new();

    let first = upload_asset(&api, &ledger, AssetKind::Image, &file_path)
        .await
        .unwrap();
    let second = upload_asset(&api, &ledger, AssetKind::Image, &file_path)
        .await
        .unwrap();

    assert_eq!(1, api.requests().len());
    assert!(matches!(first, Uploaded::Completed(_)));
    assert!(matches!(second, Uploaded::Skipped(_)));
    assert!(dir.path().join("big_ben.json").is_file());
}

#[tokio::test]
async fn rejected_upload_creates_no_record() {
    let dir = TempDir::new().unwrap();
    let file_path = write_file(dir.path(), "pin.png");
    let api = FakeWebApi::new([Some(json!({ "error": "Invalid file type" }))]);
    let ledger = AssetLedger::new();

    let err = upload_asset(&api, &ledger, AssetKind::Marker, &file_path)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rejected { ref message } if message == "Invalid file type"));
    assert!(!ledger.has(&file_path));
    assert!(!dir.path().join("pin.json").exists());
}

#[tokio::test]
async fn missing_file_sends_no_request() {
    let dir = TempDir::new().unwrap();
    let api = FakeWebApi::default();

    let err = upload_asset(
        &api,
        &AssetLedger::new(),
        AssetKind::Image,
        &dir.path().join("gone.jpg"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MissingFile(_)));
    assert!(api.requests().is_empty());
}

#[test]
fn collect_asset_files_filters_by_extension() {
    let dir = TempDir::new().unwrap();
    for file_name in ["b.png", "a.jpg", "c.JPG", "a.json", "notes.txt"] {
        write_file(dir.path(), file_name);
    }
    fs::create_dir(dir.path().join("d.png")).unwrap();

    let images = collect_asset_files(AssetKind::Image, dir.path()).unwrap();
    let markers = collect_asset_files(AssetKind::Marker, dir.path()).unwrap();

    assert_eq!(
        vec![
            dir.path().join("a.jpg"),
            dir.path().join("b.png"),
            dir.path().join("c.JPG"),
        ],
        images
    );
    assert_eq!(vec![dir.path().join("b.png")], markers);
    assert!(
        collect_asset_files(AssetKind::Image, &dir.path().join("missing"))
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn batch_uploads_only_remaining_files() {
    let dir = TempDir::new().unwrap();
    let ledger = AssetLedger::new();
    let done = write_file(dir.path(), "a.jpg");
    let done_record = AssetRecord::from_response(AssetKind::Image, image_response("img-a")).unwrap();
    ledger.store(&done, &done_record).unwrap();
    let remaining = write_file(dir.path(), "b.jpg");
    let api = FakeWebApi::new([Some(image_response("img-b"))]);

    let summary = upload_all(&api, &ledger, AssetKind::Image, dir.path())
        .await
        .unwrap();

    assert_eq!(
        BatchSummary {
            uploaded: 1,
            skipped: 1,
            failed: vec![],
        },
        summary
    );
    let requests = api.requests();
    assert_eq!(1, requests.len());
    assert!(matches!(
        &requests[0],
        Request::WithArg { body: Some(body), .. } if body.as_slice() == b"b.jpg"
    ));
    // The existing record is left untouched
    assert_eq!(Some(done_record), ledger.load(&done));
    assert!(ledger.has(&remaining));
}

#[tokio::test]
async fn batch_continues_after_failure() {
    let dir = TempDir::new().unwrap();
    let ledger = AssetLedger::new();
    let failing = write_file(dir.path(), "a.png");
    let rejected = write_file(dir.path(), "b.png");
    let succeeding = write_file(dir.path(), "c.png");
    let api = FakeWebApi::new([
        None,
        Some(json!({ "error": "Quota exceeded" })),
        Some(json!({ "marker_id": 3 })),
    ]);

    let summary = upload_all(&api, &ledger, AssetKind::Marker, dir.path())
        .await
        .unwrap();

    assert_eq!(3, api.requests().len());
    assert_eq!(1, summary.uploaded);
    assert!(!summary.is_complete());
    assert_eq!(
        vec![failing.clone(), rejected.clone()],
        summary
            .failed
            .iter()
            .map(|(file_path, _)| file_path.clone())
            .collect::<Vec<_>>()
    );
    assert_eq!("Quota exceeded", summary.failed[1].1);
    assert!(!ledger.has(&failing));
    assert!(!ledger.has(&rejected));
    assert!(ledger.has(&succeeding));
}

#[tokio::test]
async fn upload_assets_visits_images_then_markers() {
    let dir = TempDir::new().unwrap();
    let asset_dirs = AssetDirs {
        images_dir: dir.path().join("images"),
        markers_dir: dir.path().join("markers"),
    };
    fs::create_dir(&asset_dirs.images_dir).unwrap();
    fs::create_dir(&asset_dirs.markers_dir).unwrap();
    write_file(&asset_dirs.images_dir, "big_ben.png");
    write_file(&asset_dirs.markers_dir, "pin.png");
    let api = FakeWebApi::new([
        Some(image_response("img-1")),
        Some(json!({ "marker_id": "m-1" })),
    ]);

    let summary = upload_assets(&api, &asset_dirs).await.unwrap();

    assert_eq!(2, summary.uploaded);
    assert!(summary.is_complete());
    let endpoints: Vec<_> = api
        .requests()
        .iter()
        .map(|request| request.endpoint().to_owned())
        .collect();
    assert_eq!(vec!["image/upload", "marker/upload"], endpoints);
}
