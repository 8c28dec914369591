//! Unit tests for argument resolution and the command implementations.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use rstest::rstest;
use serde_json::Value;
use waymark_core::{COLLECTION_VERSION, Collection};
use waymark_ingest::HttpJsonFetchConfig;

use crate::fetch::{FetchArgs, FetchConfig};
use crate::import::{ImportArgs, run_import_with};
use crate::link::{BuildArgs, LinkCommand, ParseArgs, run_link_with};
use crate::{Cli, CliError, Command};

fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path).expect("temp paths are UTF-8")
}

#[rstest]
fn the_cli_parses_its_subcommands() {
    let cli = Cli::try_parse_from(["waymark", "import", "a.points", "b.points"])
        .expect("import should parse");
    let Command::Import(args) = cli.command else {
        panic!("expected the import subcommand");
    };
    assert_eq!(args.files.len(), 2);

    let cli = Cli::try_parse_from(["waymark", "link", "build", "--x", "1", "--z", "2"])
        .expect("link build should parse");
    assert!(matches!(cli.command, Command::Link(LinkCommand::Build(_))));

    let cli = Cli::try_parse_from(["waymark", "fetch", "--url", "https://maps.example/a.json"])
        .expect("fetch should parse");
    assert!(matches!(cli.command, Command::Fetch(_)));
}

#[rstest]
fn a_lone_centre_coordinate_is_rejected_at_parse_time() {
    let error = Cli::try_parse_from(["waymark", "link", "build", "--x", "1"])
        .expect_err("--x requires --z");
    assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[rstest]
fn importing_files_writes_a_versioned_collection() {
    let dir = tempfile::tempdir().expect("temp dir");
    let points = dir.path().join("voxelMap.points");
    std::fs::write(&points, "name:home,x:1,y:2,z:3,red:1,green:0,blue:0\n")
        .expect("write export");
    let out = utf8(dir.path().join("merged.waymark.json"));

    let args = ImportArgs {
        files: vec![utf8(points)],
        out: Some(out.clone()),
    };
    let mut sink = Vec::new();
    run_import_with(args, &mut sink).expect("import should succeed");

    assert!(sink.is_empty(), "the document goes to the file, not stdout");
    let text = std::fs::read_to_string(&out).expect("collection written");
    let collection = Collection::from_json(&text).expect("output reloads");
    assert_eq!(collection.features.len(), 1);
    assert_eq!(collection.info.version, COLLECTION_VERSION);
}

#[rstest]
fn import_without_files_is_rejected() {
    let mut sink = Vec::new();
    let error = run_import_with(ImportArgs::default(), &mut sink)
        .expect_err("nothing to import");
    assert!(matches!(error, CliError::NoImportFiles));
}

#[rstest]
fn unreadable_files_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let args = ImportArgs {
        files: vec![utf8(dir.path().join("absent.points"))],
        out: None,
    };

    let mut output = Vec::new();
    run_import_with(args, &mut output).expect("the skip is logged, not fatal");

    let collection = Collection::from_json(
        std::str::from_utf8(&output).expect("output is UTF-8"),
    )
    .expect("an empty collection is still printed");
    assert!(collection.features.is_empty());
}

#[rstest]
fn link_parse_prints_the_state_as_json() {
    let command = LinkCommand::Parse(ParseArgs {
        fragment: "#c=12,34".to_owned(),
    });

    let mut output = Vec::new();
    run_link_with(command, &mut output).expect("parse should succeed");

    let state: Value = serde_json::from_slice(&output).expect("output is JSON");
    assert_eq!(state["marker"], Value::Bool(true));
    assert_eq!(state["viewport"]["x"], 12.0);
    assert_eq!(state["viewport"]["z"], 34.0);
    assert_eq!(state["viewport"]["radius"], 100.0);
}

#[rstest]
#[case(None, "#c=12,34#b=dark\n")]
#[case(Some(50.0), "#c=12,34,r50#b=dark\n")]
fn link_build_emits_the_canonical_fragment(
    #[case] radius: Option<f64>,
    #[case] expected: &str,
) {
    let command = LinkCommand::Build(BuildArgs {
        x: Some(12.0),
        z: Some(34.0),
        radius,
        basemap: Some("dark".to_owned()),
        ..BuildArgs::default()
    });

    let mut output = Vec::new();
    run_link_with(command, &mut output).expect("build should succeed");
    assert_eq!(output, expected.as_bytes());
}

#[rstest]
fn fetch_config_requires_a_url() {
    let error = FetchArgs::default()
        .into_config()
        .expect_err("a url must come from somewhere");
    assert!(matches!(
        error,
        CliError::MissingArgument { field: "url", .. }
    ));
}

#[rstest]
fn fetch_config_applies_client_overrides() {
    let args = FetchArgs {
        url: Some("https://maps.example/base.waymark.json".to_owned()),
        timeout: Some(5),
        user_agent: Some("tester/1".to_owned()),
    };

    let config = args.into_config().expect("config should resolve");
    assert_eq!(
        config,
        FetchConfig {
            url: "https://maps.example/base.waymark.json".to_owned(),
            client: HttpJsonFetchConfig::new()
                .with_timeout(Duration::from_secs(5))
                .with_user_agent("tester/1"),
        }
    );
}
