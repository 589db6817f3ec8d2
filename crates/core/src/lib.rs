// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod asset;
pub use self::asset::{AssetKind, AssetRecord, ImageInfo, MarkerInfo, RemoteId};

pub mod feature;
pub use self::feature::{AssetDirs, TransformIssue, TransformOutcome};

pub mod ledger;
pub use self::ledger::{AssetLedger, AssetState};

pub mod map;
pub use self::map::{MapRecord, MapStore};

mod fs;

use std::{io::Error as IoError, result::Result as StdResult};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("missing required column \"{0}\"")]
    MissingColumn(&'static str),

    #[error("invalid {column} in row {row}: \"{value}\"")]
    InvalidCoordinate {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// The remote service responded without the expected identifier.
    #[error("{message}")]
    Rejected { message: String },
}

impl Error {
    /// Rejection of a response that lacks the expected identifier.
    ///
    /// Reports the error message supplied by the remote service if available.
    #[must_use]
    pub fn rejected(response: &serde_json::Value) -> Self {
        let message = match response.get("error") {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(error) => error.to_string(),
            None => format!("unexpected response: {response}"),
        };
        Self::Rejected { message }
    }
}

pub type Result<T> = StdResult<T, Error>;

pub mod prelude {
    pub use super::{Error, Result};
}
