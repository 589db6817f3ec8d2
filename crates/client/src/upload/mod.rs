// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    collections::HashMap,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use maptable_core::{
    AssetDirs, AssetKind, AssetLedger, AssetRecord, AssetState, asset::file_type_of,
};
use serde_json::json;

use crate::{prelude::*, webapi::WebApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uploaded {
    /// Already uploaded before, no request has been sent.
    Skipped(AssetRecord),

    /// Uploaded and recorded in the ledger.
    Completed(AssetRecord),
}

impl Uploaded {
    #[must_use]
    pub const fn record(&self) -> &AssetRecord {
        match self {
            Self::Skipped(record) | Self::Completed(record) => record,
        }
    }

    #[must_use]
    pub fn into_record(self) -> AssetRecord {
        match self {
            Self::Skipped(record) | Self::Completed(record) => record,
        }
    }
}

/// Upload a single file unless the ledger already has a record for it.
///
/// No ledger entry is created if the upload fails.
pub async fn upload_asset<A: WebApi>(
    api: &A,
    ledger: &AssetLedger,
    kind: AssetKind,
    file_path: &Path,
) -> Result<Uploaded> {
    if !file_path.is_file() {
        return Err(Error::MissingFile(file_path.to_path_buf()));
    }
    if let AssetState::Uploaded(record) = ledger.lookup(file_path) {
        log::info!("Skipping {kind} {}", file_path.display());
        return Ok(Uploaded::Skipped(record));
    }
    let Some(file_type) = file_type_of(file_path) else {
        return Err(Error::UnknownFileType(file_path.to_path_buf()));
    };
    log::info!("Uploading {kind} {}", file_path.display());
    let body = tokio::fs::read(file_path).await?;
    let arg = json!({
        "file_type": file_type,
    });
    let response = api
        .post_with_arg(kind.upload_endpoint(), &arg, Some(body))
        .await?;
    let record = AssetRecord::from_response(kind, response)?;
    ledger.store(file_path, &record)?;
    log::debug!(
        "Uploaded {kind} {} as {}",
        file_path.display(),
        record.remote_id()
    );
    Ok(Uploaded::Completed(record))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: Self) {
        let Self {
            uploaded,
            skipped,
            failed,
        } = other;
        self.uploaded += uploaded;
        self.skipped += skipped;
        self.failed.extend(failed);
    }
}

/// Files in `dir` with one of the file extensions of `kind` in sorted order.
///
/// A missing directory contains no files.
pub fn collect_asset_files(kind: AssetKind, dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("No {kind} directory {}", dir.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    let mut file_paths = Vec::new();
    for entry in entries {
        let file_path = entry?.path();
        let has_extension = file_type_of(&file_path)
            .is_some_and(|file_type| kind.file_extensions().contains(&file_type.as_str()));
        if has_extension && file_path.is_file() {
            file_paths.push(file_path);
        }
    }
    file_paths.sort();
    warn_about_shared_sidecars(&file_paths);
    Ok(file_paths)
}

/// Files with the same stem share a single sidecar, i.e. only the
/// first one of them will ever be uploaded.
fn warn_about_shared_sidecars(file_paths: &[PathBuf]) {
    let mut stems = HashMap::<OsString, &Path>::new();
    for file_path in file_paths {
        let Some(stem) = file_path.file_stem() else {
            continue;
        };
        if let Some(other) = stems.insert(stem.to_owned(), file_path) {
            log::warn!(
                "{} and {} share the same asset record",
                other.display(),
                file_path.display()
            );
        }
    }
}

/// Upload all files of the given kind in `dir` one after another.
///
/// Failed uploads are reported and do not abort the batch.
pub async fn upload_all<A: WebApi>(
    api: &A,
    ledger: &AssetLedger,
    kind: AssetKind,
    dir: &Path,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for file_path in collect_asset_files(kind, dir)? {
        match upload_asset(api, ledger, kind, &file_path).await {
            Ok(Uploaded::Skipped(_)) => summary.skipped += 1,
            Ok(Uploaded::Completed(_)) => summary.uploaded += 1,
            Err(err) => {
                log::error!("Failed to upload {kind} {}: {err}", file_path.display());
                summary.failed.push((file_path, err.to_string()));
            }
        }
    }
    log::info!(
        "Uploaded {uploaded} {kind}(s), skipped {skipped}, failed {failed}",
        uploaded = summary.uploaded,
        skipped = summary.skipped,
        failed = summary.failed.len(),
    );
    Ok(summary)
}

/// Upload all images and then all markers.
pub async fn upload_assets<A: WebApi>(api: &A, asset_dirs: &AssetDirs) -> Result<BatchSummary> {
    let ledger = AssetLedger::new();
    let mut summary = BatchSummary::default();
    for kind in [AssetKind::Image, AssetKind::Marker] {
        summary.merge(upload_all(api, &ledger, kind, asset_dirs.dir(kind)).await?);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests;
