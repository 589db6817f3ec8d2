// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod environment;
pub use self::environment::Environment;

pub mod map;
pub use self::map::MapSettings;

pub mod upload;
pub use self::upload::{BatchSummary, Uploaded};

pub mod webapi;
pub use self::webapi::WebApi;

#[cfg(test)]
mod testing;

use std::{io::Error as IoError, path::PathBuf, result::Result as StdResult};

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The remote service did not respond with the expected identifier.
    #[error("{message}")]
    Rejected { message: String },

    #[error("unexpected response status: {0}")]
    Status(StatusCode),

    #[error("please create an empty map first")]
    MapNotCreated,

    #[error("file missing: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("unknown file type: {}", .0.display())]
    UnknownFileType(PathBuf),

    #[error(transparent)]
    Core(maptable_core::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl From<maptable_core::Error> for Error {
    fn from(err: maptable_core::Error) -> Self {
        match err {
            maptable_core::Error::Rejected { message } => Self::Rejected { message },
            err => Self::Core(err),
        }
    }
}

pub type Result<T> = StdResult<T, Error>;

pub mod prelude {
    pub use super::{Error, Result};
}
