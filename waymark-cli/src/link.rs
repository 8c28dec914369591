//! Link command implementation for the Waymark CLI.

use std::io::Write;

use clap::{Parser, Subcommand};
use waymark_core::{Circle, FeatureId, MARKER_VIEW_RADIUS, Viewport};
use waymark_ingest::{UrlState, parse_fragment, serialise_fragment};

use crate::CliError;

/// Subcommands for working with shareable link fragments.
#[derive(Debug, Subcommand)]
pub(crate) enum LinkCommand {
    /// Decode a fragment and print the state it carries as JSON.
    Parse(ParseArgs),
    /// Encode state flags as a fragment.
    Build(BuildArgs),
}

/// CLI arguments for `link parse`.
#[derive(Debug, Parser)]
#[command(about = "Decode a link fragment into its map state")]
pub(crate) struct ParseArgs {
    /// Fragment to decode, with or without its leading '#'.
    #[arg(value_name = "fragment")]
    pub(crate) fragment: String,
}

/// CLI arguments for `link build`.
#[derive(Debug, Parser, Default)]
#[command(about = "Encode map state as a link fragment")]
pub(crate) struct BuildArgs {
    /// Centre world X.
    #[arg(long, value_name = "blocks", requires = "z", allow_negative_numbers = true)]
    pub(crate) x: Option<f64>,
    /// Centre world Z.
    #[arg(long, value_name = "blocks", requires = "x", allow_negative_numbers = true)]
    pub(crate) z: Option<f64>,
    /// View radius in blocks; leaving it out marks the centre as a pin.
    #[arg(long, value_name = "blocks", requires = "x")]
    pub(crate) radius: Option<f64>,
    /// Basemap name.
    #[arg(long, value_name = "name")]
    pub(crate) basemap: Option<String>,
    /// Feature id to select.
    #[arg(long, value_name = "id")]
    pub(crate) feature: Option<String>,
    /// Collection URL to load.
    #[arg(long, value_name = "url")]
    pub(crate) url: Option<String>,
}

pub(super) fn run_link(command: LinkCommand) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_link_with(command, &mut stdout)
}

pub(super) fn run_link_with(command: LinkCommand, writer: &mut dyn Write) -> Result<(), CliError> {
    let output = match command {
        LinkCommand::Parse(args) => {
            let state = parse_fragment(&args.fragment);
            serde_json::to_string_pretty(&state).map_err(CliError::SerialiseOutput)?
        }
        LinkCommand::Build(args) => serialise_fragment(&build_state(args)),
    };
    writer
        .write_all(output.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

fn build_state(args: BuildArgs) -> UrlState {
    let mut state = UrlState {
        basemap: args.basemap,
        feature_id: args.feature.map(FeatureId::new),
        collection_url: args.url,
        ..UrlState::default()
    };
    if let (Some(x), Some(z)) = (args.x, args.z) {
        let radius = args.radius.unwrap_or_else(|| {
            state.marker = true;
            MARKER_VIEW_RADIUS
        });
        state.viewport = Some(Viewport::Circle(Circle::new(x, z, radius)));
    }
    state
}
