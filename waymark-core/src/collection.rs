//! Versioned collection documents.
//!
//! A collection is the primary interchange bundle: schema info, an ordered
//! feature sequence, and an ordered filter sequence. Parsing is only
//! possible through the validating constructors, so a document that does
//! not declare the supported schema version can never half-load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::feature::Feature;

/// The one collection schema version this crate reads and writes.
pub const COLLECTION_VERSION: &str = "2.0.0";

/// Schema block of a collection document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Declared schema version.
    pub version: String,
}

/// A filter definition, preserved verbatim.
///
/// Filters are decoded and counted but never auto-applied; activation is
/// deliberately deferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Display name, when the document provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remaining filter definition, untouched.
    #[serde(flatten)]
    pub definition: Map<String, Value>,
}

/// Errors rejecting a collection document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectionError {
    /// The document declares no `info.version`.
    #[error("collection document does not declare info.version")]
    MissingVersion,
    /// The declared version is not the supported one.
    #[error("unsupported collection version {found}, only {} can be read", COLLECTION_VERSION)]
    UnsupportedVersion {
        /// Version string the document declared.
        found: String,
    },
    /// The text is not valid JSON.
    #[error("collection document is not valid JSON")]
    Json {
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
    /// The JSON is structurally not a collection.
    #[error("malformed collection document")]
    Document {
        /// Mapping failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Wire mirror used after the version gate; missing sequences default.
#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    filters: Vec<Filter>,
}

/// Versioned bundle of features and filters.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use waymark_core::Collection;
///
/// let document = json!({ "info": { "version": "2.0.0" } });
/// let collection = Collection::from_value(&document)?;
/// assert!(collection.features.is_empty());
/// # Ok::<(), waymark_core::CollectionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    /// Schema info; locally built bundles always carry the supported version.
    pub info: CollectionInfo,
    /// Ordered feature sequence.
    pub features: Vec<Feature>,
    /// Ordered filter sequence.
    pub filters: Vec<Filter>,
}

impl Collection {
    /// Bundle features and filters under the supported schema version.
    pub fn new(features: Vec<Feature>, filters: Vec<Filter>) -> Self {
        Self {
            info: CollectionInfo {
                version: COLLECTION_VERSION.to_owned(),
            },
            features,
            filters,
        }
    }

    /// Validate and normalise a raw collection document.
    ///
    /// The caller's document is read, never mutated. Missing `features` and
    /// `filters` sequences default to empty; a version mismatch is fatal
    /// before any feature is looked at, so structural problems never mask
    /// the version error.
    ///
    /// # Errors
    ///
    /// [`CollectionError::MissingVersion`] when the document carries no
    /// `info.version`, [`CollectionError::UnsupportedVersion`] for any
    /// version other than [`COLLECTION_VERSION`], and
    /// [`CollectionError::Document`] when the shape is not a collection.
    pub fn from_value(document: &Value) -> Result<Self, CollectionError> {
        let version = document
            .get("info")
            .and_then(|info| info.get("version"))
            .and_then(Value::as_str)
            .ok_or(CollectionError::MissingVersion)?;
        if version != COLLECTION_VERSION {
            return Err(CollectionError::UnsupportedVersion {
                found: version.to_owned(),
            });
        }
        let raw: RawCollection = serde_json::from_value(document.clone())
            .map_err(|source| CollectionError::Document { source })?;
        Ok(Self {
            info: CollectionInfo {
                version: COLLECTION_VERSION.to_owned(),
            },
            features: raw.features,
            filters: raw.filters,
        })
    }

    /// Parse and validate a collection from JSON text.
    ///
    /// # Errors
    ///
    /// [`CollectionError::Json`] for unparseable text, then everything
    /// [`Collection::from_value`] can return.
    pub fn from_json(text: &str) -> Result<Self, CollectionError> {
        let document: Value =
            serde_json::from_str(text).map_err(|source| CollectionError::Json { source })?;
        Self::from_value(&document)
    }

    /// Serialise to pretty-printed JSON for export.
    ///
    /// # Errors
    ///
    /// Propagates serialiser failures, which do not occur for well-formed
    /// feature properties.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;
    use serde_json::json;

    use crate::feature::Geometry;

    #[rstest]
    #[case("1.0.0")]
    #[case("2.0.1")]
    #[case("3")]
    fn foreign_versions_are_rejected_by_name(#[case] version: &str) {
        let document = json!({ "info": { "version": version }, "features": [] });

        let error = Collection::from_value(&document).expect_err("version should be rejected");
        match error {
            CollectionError::UnsupportedVersion { found } => assert_eq!(found, version),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "info": {} }))]
    #[case(json!({ "info": { "version": 2 } }))]
    fn documents_without_a_version_are_rejected(#[case] document: Value) {
        let error = Collection::from_value(&document).expect_err("missing version should fail");
        assert!(matches!(error, CollectionError::MissingVersion));
    }

    #[rstest]
    fn missing_sequences_default_to_empty() {
        let document = json!({ "info": { "version": "2.0.0" } });

        let collection = Collection::from_value(&document).expect("should load");
        assert!(collection.features.is_empty());
        assert!(collection.filters.is_empty());
    }

    #[rstest]
    fn version_errors_win_over_structural_errors() {
        // Features are malformed too, but the version mismatch must surface.
        let document = json!({ "info": { "version": "1.0.0" }, "features": "not-a-sequence" });

        let error = Collection::from_value(&document).expect_err("should fail");
        assert!(matches!(error, CollectionError::UnsupportedVersion { .. }));
    }

    #[rstest]
    fn filters_are_preserved_verbatim() {
        let document = json!({
            "info": { "version": "2.0.0" },
            "filters": [{ "name": "waypoints", "match": { "is_waypoint": true } }],
        });

        let collection = Collection::from_value(&document).expect("should load");
        let filter = collection.filters.first().expect("one filter");
        assert_eq!(filter.name.as_deref(), Some("waypoints"));
        assert_eq!(filter.definition.get("match"), Some(&json!({ "is_waypoint": true })));
    }

    #[rstest]
    fn export_stamps_the_supported_version() {
        let feature = Feature::new(
            "spawn",
            Geometry::Marker {
                position: Coord { x: 1.0, y: 2.0 },
            },
        );
        let collection = Collection::new(vec![feature], vec![]);

        let text = collection.to_json_pretty().expect("should serialise");
        let reread = Collection::from_json(&text).expect("exported documents reload");
        assert_eq!(reread, collection);
        assert_eq!(reread.info.version, COLLECTION_VERSION);
    }

    #[rstest]
    fn caller_documents_are_not_mutated() {
        let document = json!({ "info": { "version": "2.0.0" } });
        let before = document.clone();

        let _ = Collection::from_value(&document).expect("should load");
        assert_eq!(document, before);
    }
}
