//! File import registry.
//!
//! Dropped files are routed by name to a decoder. The registry is a static
//! table, so adding a format is one new entry plus its decoder module; the
//! orchestration in [`import_file`] never changes.

use serde_json::Value;
use thiserror::Error;
use waymark_core::{CollectionError, Feature, MapStore, StateUpdate};

use crate::files::{DroppedFile, FileReadError};
use crate::loader::load_collection;

mod schema;
mod snitches;
mod tiles;
mod waypoints;

/// Source label attached to collections loaded from dropped files.
const FILE_SOURCE: &str = "drag-drop";

/// Errors from importing a dropped file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// No registered format claims the file name.
    #[error("no importer recognises {name:?}")]
    UnrecognisedFile {
        /// Name of the rejected file.
        name: String,
    },
    /// The file contents could not be read.
    #[error(transparent)]
    Read(#[from] FileReadError),
    /// The file decoded to a collection document that failed validation.
    #[error(transparent)]
    Collection(#[from] CollectionError),
    /// A tile file reached the decoder without region coordinates in its
    /// name.
    #[error("tile name {name:?} does not carry region coordinates")]
    TileName {
        /// Name of the offending file.
        name: String,
    },
}

/// What an import put into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Display label of the recognised format.
    pub label: &'static str,
    /// Features loaded.
    pub features: usize,
    /// Filters loaded; zero for everything but collections.
    pub filters: usize,
}

/// How a format claims a file name.
enum Matcher {
    Exact(&'static str),
    Suffix(&'static str),
    Pattern(fn(&str) -> bool),
}

impl Matcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => name == *exact,
            Self::Suffix(suffix) => name.ends_with(suffix),
            Self::Pattern(predicate) => predicate(name),
        }
    }
}

/// How a format wants the file contents presented.
enum ReadMode {
    Text,
    DataUrl,
}

/// Outcome of a format decoder.
#[derive(Debug)]
enum Decoded {
    /// Plain features, loaded as one batch.
    Features(Vec<Feature>),
    /// A raw collection document, still to be validated.
    Collection(Value),
}

struct FormatEntry {
    label: &'static str,
    matcher: Matcher,
    read: ReadMode,
    decode: fn(&str, &str) -> Result<Decoded, ImportError>,
}

/// Table order is match precedence: exact names, then suffixes, then shape
/// patterns.
static FORMATS: [FormatEntry; 4] = [
    FormatEntry {
        label: "SnitchMaster snitches",
        matcher: Matcher::Exact("Snitches.csv"),
        read: ReadMode::Text,
        decode: snitches::decode,
    },
    FormatEntry {
        label: "Waymark collection",
        matcher: Matcher::Suffix(".waymark.json"),
        read: ReadMode::Text,
        decode: decode_collection,
    },
    FormatEntry {
        label: "VoxelMap waypoints",
        matcher: Matcher::Suffix(".points"),
        read: ReadMode::Text,
        decode: waypoints::decode,
    },
    FormatEntry {
        label: "JourneyMap tile",
        matcher: Matcher::Pattern(tiles::is_tile_name),
        read: ReadMode::DataUrl,
        decode: tiles::decode,
    },
];

fn find_format(name: &str) -> Option<&'static FormatEntry> {
    FORMATS.iter().find(|entry| entry.matcher.matches(name))
}

fn decode_collection(_name: &str, text: &str) -> Result<Decoded, ImportError> {
    let document =
        serde_json::from_str(text).map_err(|source| CollectionError::Json { source })?;
    Ok(Decoded::Collection(document))
}

/// Import one dropped file into the store.
///
/// The file name picks the format; the contents are then read in the mode
/// the format asks for and decoded. Feature formats land as a single
/// feature batch, collection documents go through the usual validation
/// gate with a `drag-drop` source label.
///
/// # Errors
///
/// [`ImportError::UnrecognisedFile`] when no format claims the name, plus
/// whatever the read and decode steps report.
pub async fn import_file(
    file: &dyn DroppedFile,
    store: &mut dyn MapStore,
) -> Result<ImportSummary, ImportError> {
    let name = file.name().to_owned();
    let Some(format) = find_format(&name) else {
        return Err(ImportError::UnrecognisedFile { name });
    };
    log::debug!("{name:?} matched {}", format.label);

    let content = match format.read {
        ReadMode::Text => file.read_text().await?,
        ReadMode::DataUrl => file.read_data_url().await?,
    };

    match (format.decode)(&name, &content)? {
        Decoded::Features(features) => {
            let count = features.len();
            store.apply(StateUpdate::LoadFeatures(features));
            log::info!("imported {count} features from {name:?} as {}", format.label);
            Ok(ImportSummary {
                label: format.label,
                features: count,
                filters: 0,
            })
        }
        Decoded::Collection(document) => {
            let summary = load_collection(&document, store, FILE_SOURCE)?;
            Ok(ImportSummary {
                label: format.label,
                features: summary.features,
                filters: summary.filters,
            })
        }
    }
}
