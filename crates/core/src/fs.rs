// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fs,
    io::{self, Write as _},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;

use crate::prelude::*;

/// Read and parse a JSON file.
///
/// Returns `Ok(None)` if the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(file_path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(file_path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(Into::into)
}

/// Write a JSON file by replacing it with a completely written temporary file.
///
/// Readers either see the previous contents or the new contents, but never
/// a partially written file.
pub(crate) fn write_json_atomically<T: Serialize>(file_path: &Path, value: &T) -> Result<()> {
    let parent_dir = file_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;
    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    serde_json::to_writer_pretty(&mut temp_file, value)?;
    temp_file.write_all(b"\n")?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(file_path).map_err(|err| err.error)?;
    Ok(())
}
