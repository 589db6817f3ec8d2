// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
};

use maptable_client::{MapSettings, environment::DEFAULT_API_URL};
use maptable_core::{
    AssetDirs, MapStore,
    feature::{DEFAULT_IMAGES_DIR, DEFAULT_MARKERS_DIR},
    map,
};
use serde::{Deserialize, Serialize};
use url::Url;

pub(crate) const DEFAULT_FILE_PATH: &str = "maptable.ron";

pub(crate) const DEFAULT_TABLE_FILE: &str = "table.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Base URL of the web API.
    pub(crate) api_url: Url,

    /// Record of the created map.
    pub(crate) map_data_file: PathBuf,

    pub(crate) images_dir: PathBuf,

    pub(crate) markers_dir: PathBuf,

    /// The CSV table with the points of interest.
    pub(crate) table_file: PathBuf,

    pub(crate) map: MapSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("valid URL"),
            map_data_file: map::DEFAULT_FILE_NAME.into(),
            images_dir: DEFAULT_IMAGES_DIR.into(),
            markers_dir: DEFAULT_MARKERS_DIR.into(),
            table_file: DEFAULT_TABLE_FILE.into(),
            map: MapSettings::default(),
        }
    }
}

impl Settings {
    /// Load the settings file or use defaults if it does not exist.
    pub(crate) fn load(file_path: &Path) -> anyhow::Result<Settings> {
        match fs::read_to_string(file_path) {
            Ok(text) => {
                log::info!("Loading settings from file: {}", file_path.display());
                ron::from_str(&text).map_err(Into::into)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Using default settings");
                Ok(Default::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub(crate) fn save(&self, file_path: &Path) -> anyhow::Result<()> {
        log::info!("Saving settings into file: {}", file_path.display());
        let text = ron::ser::to_string_pretty(self, Default::default())?;
        if let Some(parent_path) = file_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent_path)?;
        }
        fs::write(file_path, text)?;
        Ok(())
    }

    pub(crate) fn asset_dirs(&self) -> AssetDirs {
        AssetDirs {
            images_dir: self.images_dir.clone(),
            markers_dir: self.markers_dir.clone(),
        }
    }

    pub(crate) fn map_store(&self) -> MapStore {
        MapStore::new(self.map_data_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join(DEFAULT_FILE_PATH)).unwrap();
        assert_eq!(Settings::default(), settings);
        assert_eq!(Path::new("images"), settings.asset_dirs().images_dir);
        assert_eq!(
            Path::new("map_data.json"),
            settings.map_store().file_path()
        );
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join(DEFAULT_FILE_PATH);
        let mut settings = Settings::default();
        settings.map.title = "Paris Cafés".to_owned();
        settings.images_dir = "photos".into();
        settings.save(&file_path).unwrap();
        assert_eq!(settings, Settings::load(&file_path).unwrap());
    }

    #[test]
    fn omitted_fields_are_defaulted() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join(DEFAULT_FILE_PATH);
        fs::write(&file_path, r#"(table_file: "pois.csv", map: (title: "Pubs"))"#).unwrap();
        let settings = Settings::load(&file_path).unwrap();
        assert_eq!(Path::new("pois.csv"), settings.table_file);
        assert_eq!("Pubs", settings.map.title);
        assert_eq!(MapSettings::default().basemap, settings.map.basemap);
        assert_eq!(DEFAULT_API_URL, settings.api_url.as_str());
    }
}
