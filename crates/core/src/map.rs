// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    RemoteId,
    fs::{read_json, write_json_atomically},
    prelude::*,
};

pub const DEFAULT_FILE_NAME: &str = "map_data.json";

/// The remote map as returned when it has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: RemoteId,

    /// All other fields of the creation response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapRecord {
    /// Validate the response of a map creation request.
    pub fn from_response(response: Value) -> Result<Self> {
        if response.get("id").is_none() {
            return Err(Error::rejected(&response));
        }
        serde_json::from_value(response).map_err(Into::into)
    }
}

/// File-based storage of the [`MapRecord`].
///
/// The record is written once after the map has been created
/// and only read afterwards.
#[derive(Debug, Clone)]
pub struct MapStore {
    file_path: PathBuf,
}

impl MapStore {
    #[must_use]
    pub const fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.file_path.is_file()
    }

    pub fn load(&self) -> Result<Option<MapRecord>> {
        read_json(&self.file_path)
    }

    pub fn store(&self, record: &MapRecord) -> Result<()> {
        log::debug!("Storing map record {}", self.file_path.display());
        write_json_atomically(&self.file_path, record)
    }
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME.into())
    }
}
