// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local record of uploaded assets.
//!
//! Each uploaded file has a JSON sidecar with the same stem in the same
//! directory, e.g. `images/big_ben.jpg` -> `images/big_ben.json`. The
//! presence of a valid sidecar is the only upload completion signal, so
//! listing the asset directory reveals what remains to be uploaded.

use std::path::{Path, PathBuf};

use crate::{AssetRecord, fs::read_json, fs::write_json_atomically, prelude::*};

pub const SIDECAR_FILE_SUFFIX: &str = "json";

/// Path of the sidecar file for an asset file.
#[must_use]
pub fn sidecar_file_path(file_path: &Path) -> PathBuf {
    file_path.with_extension(SIDECAR_FILE_SUFFIX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState {
    NotUploaded,
    Uploaded(AssetRecord),
}

impl AssetState {
    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        matches!(self, Self::Uploaded(_))
    }

    #[must_use]
    pub fn into_record(self) -> Option<AssetRecord> {
        match self {
            Self::NotUploaded => None,
            Self::Uploaded(record) => Some(record),
        }
    }
}

/// Sidecar-based asset ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetLedger;

impl AssetLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn has(&self, file_path: &Path) -> bool {
        self.lookup(file_path).is_uploaded()
    }

    #[must_use]
    pub fn load(&self, file_path: &Path) -> Option<AssetRecord> {
        self.lookup(file_path).into_record()
    }

    /// Determine the upload state of an asset file.
    ///
    /// Unreadable or unparsable sidecars are reported as
    /// [`AssetState::NotUploaded`] for uploading the file again.
    #[must_use]
    pub fn lookup(&self, file_path: &Path) -> AssetState {
        let sidecar_path = sidecar_file_path(file_path);
        match read_json::<AssetRecord>(&sidecar_path) {
            Ok(Some(record)) => AssetState::Uploaded(record),
            Ok(None) => AssetState::NotUploaded,
            Err(err) => {
                log::warn!(
                    "Ignoring invalid asset record {}: {err}",
                    sidecar_path.display()
                );
                AssetState::NotUploaded
            }
        }
    }

    pub fn store(&self, file_path: &Path, record: &AssetRecord) -> Result<()> {
        let sidecar_path = sidecar_file_path(file_path);
        log::debug!("Storing asset record {}", sidecar_path.display());
        write_json_atomically(&sidecar_path, record)
    }
}

#[cfg(test)]
mod tests;
