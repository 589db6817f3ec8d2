// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prelude::*;

/// Opaque identifier assigned by the remote service.
///
/// Both JSON strings and JSON integers are accepted and serialized
/// back in their original representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Integer(i64),
    String(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(id) => write!(f, "{id}"),
            Self::String(id) => f.write_str(id),
        }
    }
}

impl From<&RemoteId> for Value {
    fn from(from: &RemoteId) -> Self {
        match from {
            RemoteId::Integer(id) => (*id).into(),
            RemoteId::String(id) => id.clone().into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Marker,
}

impl AssetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Marker => "marker",
        }
    }

    /// Name of the response field that signals a successful upload.
    #[must_use]
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Image => "image_id",
            Self::Marker => "marker_id",
        }
    }

    #[must_use]
    pub const fn upload_endpoint(self) -> &'static str {
        match self {
            Self::Image => "image/upload",
            Self::Marker => "marker/upload",
        }
    }

    /// Lowercase file extensions that are collected for a batch upload.
    #[must_use]
    pub const fn file_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => &["jpg", "png"],
            Self::Marker => &["png"],
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The file type tag of an upload, i.e. the lowercase file extension.
#[must_use]
pub fn file_type_of(file_path: &Path) -> Option<String> {
    file_path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// The upload response of an image.
///
/// Only the identifier is mandatory. The metadata is kept as returned
/// and validated when it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub image_id: RemoteId,

    /// All other fields of the upload response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageInfo {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.pixels("width")
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.pixels("height")
    }

    /// Color for rendering the tip of the pin.
    #[must_use]
    pub fn tip_color(&self) -> Option<&str> {
        self.extra.get("tip_color").and_then(Value::as_str)
    }

    /// Dominant color of the image.
    #[must_use]
    pub fn avg_color(&self) -> Option<&str> {
        self.extra.get("avg_color").and_then(Value::as_str)
    }

    fn pixels(&self, field: &str) -> Option<u32> {
        self.extra
            .get(field)
            .and_then(Value::as_u64)
            .and_then(|pixels| u32::try_from(pixels).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerInfo {
    pub marker_id: RemoteId,

    /// All other fields of the upload response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The remote counterpart of an uploaded file.
///
/// Serialized as the verbatim upload response. The kind is recovered
/// from the identifier field that is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetRecord {
    Image(ImageInfo),
    Marker(MarkerInfo),
}

impl AssetRecord {
    /// Validate the response of an upload request.
    pub fn from_response(kind: AssetKind, response: Value) -> Result<Self> {
        if response.get(kind.id_field()).is_none() {
            return Err(Error::rejected(&response));
        }
        let record = match kind {
            AssetKind::Image => Self::Image(serde_json::from_value(response)?),
            AssetKind::Marker => Self::Marker(serde_json::from_value(response)?),
        };
        Ok(record)
    }

    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        match self {
            Self::Image(_) => AssetKind::Image,
            Self::Marker(_) => AssetKind::Marker,
        }
    }

    #[must_use]
    pub const fn remote_id(&self) -> &RemoteId {
        match self {
            Self::Image(info) => &info.image_id,
            Self::Marker(info) => &info.marker_id,
        }
    }
}
