// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use geojson::FeatureCollection;
use maptable_core::{MapRecord, MapStore};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    prelude::*,
    webapi::{WebApi, expect_field},
};

pub const CREATE_ENDPOINT: &str = "map/upload";

pub const UPDATE_ENDPOINT: &str = "map/update";

pub const REFRESH_IMAGE_ENDPOINT: &str = "map/refresh_image";

/// Title, visibility and presentation of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub title: String,

    /// Short identifier that appears in the URL of the map.
    pub short_name: String,

    /// Either `public`, `unlisted` or `private`.
    pub visibility: String,

    /// Style of the base map, e.g. `maphub-light`.
    pub basemap: String,

    /// Markdown text that is displayed alongside the map.
    pub description: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            title: "London Attractions".to_owned(),
            short_name: "london-attractions".to_owned(),
            visibility: "public".to_owned(),
            basemap: "maphub-light".to_owned(),
            description: "Sample map for MapHub API tutorial:\n\
                          [Create a map from a table CSV \
                          file](https://docs.maphub.net/tutorials/first_map/tutorial.html)\n\n\
                          Texts and images are from visitlondon.com"
                .to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    New(MapRecord),

    /// A map has been created before, no request has been sent.
    AlreadyExists(MapRecord),
}

impl Created {
    #[must_use]
    pub const fn record(&self) -> &MapRecord {
        match self {
            Self::New(record) | Self::AlreadyExists(record) => record,
        }
    }
}

/// Create an empty map unless a map has already been created.
pub async fn create_empty<A: WebApi>(
    api: &A,
    store: &MapStore,
    settings: &MapSettings,
) -> Result<Created> {
    if let Some(record) = store.load()? {
        log::info!("Map already exists: {}", record.id);
        return Ok(Created::AlreadyExists(record));
    }
    let arg = json!({
        "file_type": "empty",
        "title": settings.title,
        "short_name": settings.short_name,
        "visibility": settings.visibility,
    });
    let response = api.post_with_arg(CREATE_ENDPOINT, &arg, None).await?;
    let record = MapRecord::from_response(response)?;
    store.store(&record)?;
    log::info!("Map created: {}", record.id);
    Ok(Created::New(record))
}

/// Replace the entire contents of the map.
///
/// Features that are not contained in `collection` are removed from the map.
pub async fn update<A: WebApi>(
    api: &A,
    store: &MapStore,
    settings: &MapSettings,
    collection: &FeatureCollection,
) -> Result<MapRecord> {
    let record = load_created(store)?;
    let body = json!({
        "map_id": Value::from(&record.id),
        "geojson": serde_json::to_value(collection)?,
        "basemap": settings.basemap,
        "description": settings.description,
        "visibility": settings.visibility,
    });
    let response = api.post_json(UPDATE_ENDPOINT, &body).await?;
    expect_field(&response, "id")?;
    log::info!(
        "Map {} updated with {} feature(s)",
        record.id,
        collection.features.len()
    );
    Ok(record)
}

/// Regenerate the preview image of the map.
///
/// Returns the message of the remote service.
pub async fn refresh_preview<A: WebApi>(api: &A, store: &MapStore) -> Result<String> {
    let record = load_created(store)?;
    let body = json!({
        "map_id": Value::from(&record.id),
    });
    let response = api.post_json(REFRESH_IMAGE_ENDPOINT, &body).await?;
    expect_field(&response, "id")?;
    let message = response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    Ok(message)
}

fn load_created(store: &MapStore) -> Result<MapRecord> {
    store.load()?.ok_or(Error::MapNotCreated)
}
