//! Command-line interface for Waymark's import and link tooling.
#![forbid(unsafe_code)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;
use waymark_core::CollectionError;
use waymark_ingest::{FetchBuildError, FetchError};

mod fetch;
mod import;
mod link;

use fetch::FetchArgs;
use import::ImportArgs;
use link::LinkCommand;

const ARG_FETCH_TIMEOUT: &str = "timeout";
const ARG_FETCH_URL: &str = "url";
const ARG_FETCH_USER_AGENT: &str = "user-agent";
const ARG_IMPORT_OUT: &str = "out";
const ENV_FETCH_URL: &str = "WAYMARK_CMDS_FETCH_URL";

/// Run the Waymark CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Import(args) => import::run_import(args),
        Command::Link(command) => link::run_link(command),
        Command::Fetch(args) => fetch::run_fetch(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Import map data and work with shareable Waymark links",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import exported files into a collection document.
    Import(ImportArgs),
    /// Decode and encode shareable link fragments.
    #[command(subcommand)]
    Link(LinkCommand),
    /// Fetch and validate a remote collection.
    Fetch(FetchArgs),
}

/// Current-thread runtime for the commands that await ingestion calls.
fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

/// Errors emitted by the Waymark CLI.
///
/// Keep this error type reasonably small, as many CLI helpers return
/// `Result<_, CliError>`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The import command was given nothing to import.
    #[error("no files to import; pass at least one path")]
    NoImportFiles,
    /// The async runtime could not be started.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The HTTP client could not be constructed.
    #[error(transparent)]
    BuildFetch(#[from] FetchBuildError),
    /// Fetching the collection document failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The fetched document is not a loadable collection.
    #[error("collection from {url} failed validation: {source}")]
    RejectedCollection {
        url: String,
        #[source]
        source: CollectionError,
    },
    /// Serialising the output document failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing to the output stream failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing the collection file failed.
    #[error("failed to write collection to {path:?}: {source}")]
    WriteCollection {
        path: camino::Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests;
