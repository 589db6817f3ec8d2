// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Transformation of a CSV table into a GeoJSON feature collection.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AssetKind, AssetLedger, AssetRecord, AssetState, ImageInfo, prelude::*};

pub mod dialect;
pub use self::dialect::{Dialect, sniff};

pub const REQUIRED_COLUMNS: [&str; 5] = ["latitude", "longitude", "title", "description", "url"];

pub const DEFAULT_IMAGES_DIR: &str = "images";

pub const DEFAULT_MARKERS_DIR: &str = "markers";

/// Directories for resolving the asset references of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDirs {
    pub images_dir: PathBuf,
    pub markers_dir: PathBuf,
}

impl AssetDirs {
    #[must_use]
    pub fn dir(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Image => &self.images_dir,
            AssetKind::Marker => &self.markers_dir,
        }
    }
}

impl Default for AssetDirs {
    fn default() -> Self {
        Self {
            images_dir: DEFAULT_IMAGES_DIR.into(),
            markers_dir: DEFAULT_MARKERS_DIR.into(),
        }
    }
}

/// A non-fatal problem with a single row.
///
/// Rows are numbered starting at 1 for the first record below the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformIssue {
    MissingAssetFile {
        row: usize,
        kind: AssetKind,
        file_path: PathBuf,
    },
    AssetNotUploaded {
        row: usize,
        kind: AssetKind,
        file_path: PathBuf,
    },
    AssetKindMismatch {
        row: usize,
        expected: AssetKind,
        file_path: PathBuf,
    },
    /// The image record lacks the dimensions or colors.
    IncompleteImageRecord { row: usize, file_path: PathBuf },
    /// Both a built-in and a custom marker are given. The custom marker is used.
    ConflictingIcons {
        row: usize,
        icon_default: String,
        icon_custom: String,
    },
}

impl fmt::Display for TransformIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAssetFile {
                row,
                kind,
                file_path,
            } => write!(f, "row {row}: {kind} file missing: {}", file_path.display()),
            Self::AssetNotUploaded {
                row,
                kind,
                file_path,
            } => write!(
                f,
                "row {row}: {kind} not uploaded yet, please upload it first: {}",
                file_path.display()
            ),
            Self::AssetKindMismatch {
                row,
                expected,
                file_path,
            } => write!(
                f,
                "row {row}: asset record is not of kind {expected}: {}",
                file_path.display()
            ),
            Self::IncompleteImageRecord { row, file_path } => write!(
                f,
                "row {row}: image record without dimensions or colors: {}",
                file_path.display()
            ),
            Self::ConflictingIcons {
                row,
                icon_default,
                icon_custom,
            } => write!(
                f,
                "row {row}: using custom marker \"{icon_custom}\" instead of built-in icon \
                 \"{icon_default}\""
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub collection: FeatureCollection,
    pub issues: Vec<TransformIssue>,
}

#[derive(Debug, Deserialize)]
struct Row {
    latitude: String,
    longitude: String,
    title: String,
    description: String,
    url: String,
    #[serde(default)]
    icon_default: Option<String>,
    #[serde(default)]
    icon_custom: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

pub fn transform_file(file_path: &Path, asset_dirs: &AssetDirs) -> Result<TransformOutcome> {
    log::info!("Reading table {}", file_path.display());
    let csv_text = fs::read_to_string(file_path)?;
    transform(&csv_text, asset_dirs)
}

/// Create a feature for each row of the table.
///
/// Fails without any result if a required column is missing, if a record
/// is malformed, or if a coordinate is not a finite number.
pub fn transform(csv_text: &str, asset_dirs: &AssetDirs) -> Result<TransformOutcome> {
    // Byte order mark as written by some spreadsheet applications
    let csv_text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);
    let dialect = sniff(csv_text);
    log::debug!("Detected CSV dialect: {dialect:?}");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .has_headers(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(Error::MissingColumn(missing));
    }
    let mut transformer = Transformer {
        asset_dirs,
        ledger: AssetLedger::new(),
        issues: Vec::new(),
    };
    let mut features = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = record.deserialize::<Row>(Some(&headers))?;
        features.push(transformer.feature(index + 1, row)?);
    }
    log::info!("Created {} feature(s)", features.len());
    Ok(TransformOutcome {
        collection: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        issues: transformer.issues,
    })
}

struct Transformer<'a> {
    asset_dirs: &'a AssetDirs,
    ledger: AssetLedger,
    issues: Vec<TransformIssue>,
}

impl Transformer<'_> {
    fn feature(&mut self, row_number: usize, row: Row) -> Result<Feature> {
        let Row {
            latitude,
            longitude,
            title,
            description,
            url,
            icon_default,
            icon_custom,
            image,
        } = row;
        let latitude = parse_coordinate(row_number, "latitude", &latitude)?;
        let longitude = parse_coordinate(row_number, "longitude", &longitude)?;

        let mut properties = JsonObject::new();
        properties.insert("title".to_owned(), title.into());
        properties.insert("description".to_owned(), description.into());
        properties.insert("url".to_owned(), url.into());

        let icon_default = icon_default.filter(|icon| !icon.is_empty());
        let icon_custom = icon_custom.filter(|icon| !icon.is_empty());
        let marker_id = icon_custom.as_deref().and_then(|file_name| {
            self.resolve(row_number, AssetKind::Marker, file_name)
                .map(|record| Value::from(record.remote_id()))
        });
        match (icon_default, marker_id) {
            (Some(icon_default), Some(marker_id)) => {
                self.report(TransformIssue::ConflictingIcons {
                    row: row_number,
                    icon_default,
                    icon_custom: icon_custom.unwrap_or_default(),
                });
                properties.insert("marker_id".to_owned(), marker_id);
            }
            (None, Some(marker_id)) => {
                properties.insert("marker_id".to_owned(), marker_id);
            }
            (Some(icon_default), None) => {
                properties.insert("marker-symbol".to_owned(), icon_default.into());
            }
            (None, None) => (),
        }

        if let Some(file_name) = image.filter(|image| !image.is_empty()) {
            if let Some(AssetRecord::Image(info)) =
                self.resolve(row_number, AssetKind::Image, &file_name)
            {
                if let Some(image) = image_property(&info) {
                    properties.insert("image".to_owned(), image);
                } else {
                    self.report(TransformIssue::IncompleteImageRecord {
                        row: row_number,
                        file_path: self.asset_dirs.images_dir.join(&file_name),
                    });
                }
            }
        }

        Ok(Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::Point(vec![
                longitude, latitude,
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }

    /// Look up the uploaded asset record of a referenced file.
    ///
    /// Unresolvable references are reported as issues.
    fn resolve(&mut self, row: usize, kind: AssetKind, file_name: &str) -> Option<AssetRecord> {
        let file_path = self.asset_dirs.dir(kind).join(file_name);
        if !file_path.is_file() {
            self.report(TransformIssue::MissingAssetFile {
                row,
                kind,
                file_path,
            });
            return None;
        }
        match self.ledger.lookup(&file_path) {
            AssetState::Uploaded(record) if record.kind() == kind => Some(record),
            AssetState::Uploaded(_) => {
                self.report(TransformIssue::AssetKindMismatch {
                    row,
                    expected: kind,
                    file_path,
                });
                None
            }
            AssetState::NotUploaded => {
                self.report(TransformIssue::AssetNotUploaded {
                    row,
                    kind,
                    file_path,
                });
                None
            }
        }
    }

    fn report(&mut self, issue: TransformIssue) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }
}

fn image_property(info: &ImageInfo) -> Option<Value> {
    let image = json!({
        "id": Value::from(&info.image_id),
        "w": info.width()?,
        "h": info.height()?,
        "tip_color": info.tip_color()?,
        "avg_color": info.avg_color()?,
    });
    Some(image)
}

fn parse_coordinate(row: usize, column: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|degrees| degrees.is_finite())
        .ok_or_else(|| Error::InvalidCoordinate {
            row,
            column,
            value: value.to_owned(),
        })
}
