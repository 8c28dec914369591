//! Fetch command implementation for the Waymark CLI.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_core::Collection;
use waymark_ingest::{HttpJsonFetch, HttpJsonFetchConfig, JsonFetch};

use crate::{
    ARG_FETCH_TIMEOUT, ARG_FETCH_URL, ARG_FETCH_USER_AGENT, CliError, ENV_FETCH_URL, runtime,
};

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch a collection document over HTTP, validate it against \
                 the supported schema version, and print the accepted \
                 document. The URL and client settings can come from CLI \
                 flags, configuration files, or environment variables.",
    about = "Fetch and validate a remote collection"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct FetchArgs {
    /// Collection URL to fetch.
    #[arg(long = ARG_FETCH_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_FETCH_TIMEOUT, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout: Option<u64>,
    /// User agent header to present.
    #[arg(long = ARG_FETCH_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

impl FetchArgs {
    pub(crate) fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FetchConfig::try_from(merged)
    }
}

/// Resolved `fetch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    /// URL of the collection document.
    pub(crate) url: String,
    /// HTTP client settings.
    pub(crate) client: HttpJsonFetchConfig,
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = CliError;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        let url = args.url.ok_or(CliError::MissingArgument {
            field: ARG_FETCH_URL,
            env: ENV_FETCH_URL,
        })?;

        let mut client = HttpJsonFetchConfig::new();
        if let Some(seconds) = args.timeout {
            client = client.with_timeout(Duration::from_secs(seconds));
        }
        if let Some(user_agent) = args.user_agent {
            client = client.with_user_agent(user_agent);
        }
        Ok(Self { url, client })
    }
}

pub(super) fn run_fetch(args: FetchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_fetch_with(args, &mut stdout)
}

pub(super) fn run_fetch_with(args: FetchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let FetchConfig { url, client } = args.into_config()?;
    let fetch = HttpJsonFetch::with_config(client)?;
    let runtime = runtime()?;
    let document = runtime.block_on(fetch.fetch_json(&url))?;

    let collection = Collection::from_value(&document)
        .map_err(|source| CliError::RejectedCollection { url: url.clone(), source })?;
    log::info!(
        "{url}: {} features and {} filters",
        collection.features.len(),
        collection.filters.len()
    );

    let payload = collection.to_json_pretty().map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}
