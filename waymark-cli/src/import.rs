//! Import command implementation for the Waymark CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::MemoryMapStore;
use waymark_ingest::{DiskFile, import_file};

use crate::{ARG_IMPORT_OUT, CliError, runtime};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import exported map data (VoxelMap waypoints, SnitchMaster \
                 snitches, JourneyMap tiles, or collection documents) and \
                 print the merged result as one collection document. Files \
                 that cannot be read or recognised are skipped with a \
                 warning.",
    about = "Import exported files into a collection document"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct ImportArgs {
    /// Files to import, applied in order.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) files: Vec<Utf8PathBuf>,
    /// Write the collection here instead of standard output.
    #[arg(long = ARG_IMPORT_OUT, value_name = "path")]
    #[serde(default)]
    pub(crate) out: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) files: Vec<Utf8PathBuf>,
    pub(crate) out: Option<Utf8PathBuf>,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        if args.files.is_empty() {
            return Err(CliError::NoImportFiles);
        }
        Ok(Self {
            files: args.files,
            out: args.out,
        })
    }
}

pub(super) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(super) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = import_files(&config.files)?;
    let payload = store
        .to_collection()
        .to_json_pretty()
        .map_err(CliError::SerialiseOutput)?;
    match &config.out {
        Some(path) => write_collection_file(path, &payload),
        None => {
            writer
                .write_all(payload.as_bytes())
                .and_then(|()| writer.write_all(b"\n"))
                .map_err(CliError::WriteOutput)
        }
    }
}

/// Import every file into one store; a file that fails is logged and
/// skipped so the rest still land.
fn import_files(files: &[Utf8PathBuf]) -> Result<MemoryMapStore, CliError> {
    let runtime = runtime()?;
    let mut store = MemoryMapStore::new();
    runtime.block_on(async {
        for path in files {
            let file = DiskFile::new(path.clone());
            match import_file(&file, &mut store).await {
                Ok(summary) => log::info!(
                    "{path}: {} features and {} filters as {}",
                    summary.features,
                    summary.filters,
                    summary.label
                ),
                Err(error) => log::warn!("skipping {path}: {error}"),
            }
        }
    });
    Ok(store)
}

fn write_collection_file(path: &Utf8Path, payload: &str) -> Result<(), CliError> {
    std::fs::write(path, format!("{payload}\n")).map_err(|source| CliError::WriteCollection {
        path: path.to_path_buf(),
        source,
    })
}
