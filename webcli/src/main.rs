// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{path::PathBuf, process::ExitCode};

use clap::{Arg, ArgMatches, Command};
use maptable_client::{
    Environment, map,
    upload::{self, BatchSummary},
};
use maptable_core::feature::{TransformOutcome, transform_file};

mod settings;
use self::settings::Settings;

const DEFAULT_LOG_FILTER: &str = "info";

const API_KEY_ENV: &str = "MAPHUB_API_KEY";

const API_KEY_ARG: &str = "api-key";

const SETTINGS_ARG: &str = "settings";

const TABLE_ARG: &str = "table";

fn command() -> Command {
    Command::new("maptable")
        .about("Publishes a CSV table of points of interest as a MapHub map")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new(SETTINGS_ARG)
                .long(SETTINGS_ARG)
                .help("The settings file")
                .num_args(1)
                .default_value(settings::DEFAULT_FILE_PATH)
                .global(true),
        )
        .arg(
            Arg::new(API_KEY_ARG)
                .long(API_KEY_ARG)
                .help("The MapHub API key")
                .num_args(1)
                .env(API_KEY_ENV)
                .hide_env_values(true)
                .global(true),
        )
        .subcommand(Command::new("create-map").about("Creates an empty map once"))
        .subcommand(
            Command::new("upload-assets")
                .about("Uploads all images and markers that have not been uploaded yet"),
        )
        .subcommand(
            Command::new("update-map")
                .about("Replaces the contents of the map with the features of the table")
                .arg(
                    Arg::new(TABLE_ARG)
                        .long(TABLE_ARG)
                        .help("The CSV table, overrides the settings")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("refresh-preview").about("Regenerates the preview image of the map"),
        )
        .subcommand(
            Command::new("write-settings")
                .about("Writes the effective settings for customizing them"),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let matches = command().get_matches();
    let settings_path = matches
        .get_one::<String>(SETTINGS_ARG)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings::DEFAULT_FILE_PATH.into());
    let settings = Settings::load(&settings_path)?;

    match matches.subcommand() {
        Some(("create-map", _)) => {
            let env = new_environment(&matches, &settings)?;
            let created = map::create_empty(&env, &settings.map_store(), &settings.map).await?;
            match created {
                map::Created::New(record) => {
                    log::info!("Map created");
                    println!("{}", serde_json_pretty(&record)?);
                }
                map::Created::AlreadyExists(_) => {
                    log::info!(
                        "Map already exists, delete {} for creating a new one",
                        settings.map_data_file.display()
                    );
                }
            }
        }
        Some(("upload-assets", _)) => {
            let env = new_environment(&matches, &settings)?;
            let summary = upload::upload_assets(&env, &settings.asset_dirs()).await?;
            if !report_batch_summary(&summary) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(("update-map", sub_matches)) => {
            let table_file = sub_matches
                .get_one::<String>(TABLE_ARG)
                .map_or_else(|| settings.table_file.clone(), PathBuf::from);
            // Fail early before issuing any requests
            let store = settings.map_store();
            if !store.exists() {
                return Err(maptable_client::Error::MapNotCreated.into());
            }
            let TransformOutcome { collection, issues } =
                transform_file(&table_file, &settings.asset_dirs())?;
            if !issues.is_empty() {
                log::warn!("{} row(s) with unresolved assets", issues.len());
            }
            let env = new_environment(&matches, &settings)?;
            let record = map::update(&env, &store, &settings.map, &collection).await?;
            log::info!("Map updated");
            println!("{}", serde_json_pretty(&record)?);
        }
        Some(("refresh-preview", _)) => {
            let env = new_environment(&matches, &settings)?;
            let message = map::refresh_preview(&env, &settings.map_store()).await?;
            println!("{message}");
        }
        Some(("write-settings", _)) => {
            settings.save(&settings_path)?;
        }
        Some((subcommand, _)) => {
            unreachable!("Unknown subcommand {subcommand}");
        }
        None => unreachable!("subcommand required"),
    }

    Ok(ExitCode::SUCCESS)
}

fn new_environment(matches: &ArgMatches, settings: &Settings) -> anyhow::Result<Environment> {
    let Some(api_key) = matches
        .get_one::<String>(API_KEY_ARG)
        .filter(|api_key| !api_key.trim().is_empty())
    else {
        anyhow::bail!("missing API key, use --{API_KEY_ARG} or set {API_KEY_ENV}");
    };
    Ok(Environment::new(
        settings.api_url.clone(),
        api_key.trim().to_owned(),
    ))
}

/// Returns `true` if all uploads succeeded.
fn report_batch_summary(summary: &BatchSummary) -> bool {
    let BatchSummary {
        uploaded,
        skipped,
        failed,
    } = summary;
    log::info!("Uploaded {uploaded} and skipped {skipped} asset(s)");
    for (file_path, err) in failed {
        log::error!("Not uploaded: {} ({err})", file_path.display());
    }
    summary.is_complete()
}

fn serde_json_pretty(value: &impl serde::Serialize) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
