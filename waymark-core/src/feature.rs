//! Canonical annotation features.
//!
//! A [`Feature`] is one annotated map entity: a stable identifier, a
//! geometry variant, an open property map, and optional presentation hints.
//! Coordinates live on the voxel-world plane with `Coord.x` holding world X
//! (grows east) and `Coord.y` holding world Z (grows south). The JSON wire
//! form is the historical one: positions serialise as `[z, x]` pairs, image
//! bounds as `[[north, west], [south, east]]` corner pairs, and the variant
//! tag is a lowercase `type` field.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open property mapping attached to a feature.
pub type Properties = BTreeMap<String, Value>;

/// Identifier of a feature, unique within a session.
///
/// Decoders derive ids deterministically from source identity (coordinates,
/// names, a source-tag prefix) so re-importing the same source yields the
/// same ids and the store can overwrite instead of duplicating.
///
/// # Examples
/// ```
/// use waymark_core::FeatureId;
///
/// let id = FeatureId::new("dragdrop-journeymap-tile-1--2");
/// assert_eq!(id.as_str(), "dragdrop-journeymap-tile-1--2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Wrap a raw identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for FeatureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for FeatureId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometry of a feature.
///
/// Exactly one variant per feature; the variant tag never changes after
/// creation. Consumers match exhaustively so an unhandled variant fails at
/// compile time rather than silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGeometry", into = "RawGeometry")]
pub enum Geometry {
    /// A point of note at a single position.
    Marker {
        /// Marker position.
        position: Coord<f64>,
    },
    /// A closed ring of positions.
    Polygon {
        /// Ring corners in drawing order.
        positions: Vec<Coord<f64>>,
    },
    /// A georeferenced image, such as a rendered map tile.
    Image {
        /// Image location, typically a data-URL for dropped tiles.
        url: String,
        /// Opposite-corner pair covered by the image.
        bounds: Rect<f64>,
    },
}

/// Wire mirror of [`Geometry`]: `[z, x]` pairs under a lowercase `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawGeometry {
    Marker { position: [f64; 2] },
    Polygon { positions: Vec<[f64; 2]> },
    Image { url: String, bounds: [[f64; 2]; 2] },
}

fn coord_from_wire([z, x]: [f64; 2]) -> Coord<f64> {
    Coord { x, y: z }
}

fn coord_to_wire(coord: Coord<f64>) -> [f64; 2] {
    [coord.y, coord.x]
}

impl From<RawGeometry> for Geometry {
    fn from(raw: RawGeometry) -> Self {
        match raw {
            RawGeometry::Marker { position } => Self::Marker {
                position: coord_from_wire(position),
            },
            RawGeometry::Polygon { positions } => Self::Polygon {
                positions: positions.into_iter().map(coord_from_wire).collect(),
            },
            // `Rect::new` normalises the corners, so either corner order on
            // the wire produces the same rectangle.
            RawGeometry::Image { url, bounds: [a, b] } => Self::Image {
                url,
                bounds: Rect::new(coord_from_wire(a), coord_from_wire(b)),
            },
        }
    }
}

impl From<Geometry> for RawGeometry {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Marker { position } => Self::Marker {
                position: coord_to_wire(position),
            },
            Geometry::Polygon { positions } => Self::Polygon {
                positions: positions.into_iter().map(coord_to_wire).collect(),
            },
            Geometry::Image { url, bounds } => Self::Image {
                url,
                bounds: [coord_to_wire(bounds.min()), coord_to_wire(bounds.max())],
            },
        }
    }
}

/// Presentation hints carried by a feature when its source encodes them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureStyle {
    /// Circle-marker rendering parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_marker: Option<CircleMarkerStyle>,
}

/// Circle-marker rendering parameters in the historical wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleMarkerStyle {
    /// Marker radius in pixels.
    pub radius: f64,
    /// Stroke weight in pixels.
    pub weight: f64,
    /// Fill colour as a CSS colour string.
    #[serde(rename = "fillColor")]
    pub fill_color: String,
    /// Stroke colour as a CSS colour string.
    pub color: String,
}

/// One annotated map entity.
///
/// Features are value objects: decoders hand them to the store, which owns
/// their lifecycle afterwards.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{Feature, Geometry};
///
/// let feature = Feature::new(
///     "base-camp",
///     Geometry::Marker {
///         position: Coord { x: 40.0, y: -120.0 },
///     },
/// );
/// assert_eq!(feature.id.as_str(), "base-camp");
/// assert!(feature.properties.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable identifier, immutable once created.
    pub id: FeatureId,
    /// Geometry variant.
    pub geometry: Geometry,
    /// Open property map; decoders attach provenance flags here.
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    /// Optional presentation hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<FeatureStyle>,
}

impl Feature {
    /// Construct a feature with empty properties and no style.
    pub fn new(id: impl Into<FeatureId>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: Properties::new(),
            style: None,
        }
    }

    /// Attach a property map.
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Attach presentation hints.
    #[must_use]
    pub fn with_style(mut self, style: FeatureStyle) -> Self {
        self.style = Some(style);
        self
    }
}
