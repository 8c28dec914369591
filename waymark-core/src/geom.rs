//! Circle and rectangle conversions on the world plane.
//!
//! Viewports are circular region descriptors (centre + radius) convertible
//! to axis-aligned rectangular bounds and back. Under the plane convention
//! in [`crate::feature`], `Rect::min` is the north-west corner and
//! `Rect::max` the south-east corner.

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::feature::Geometry;

/// Radius applied when deriving a viewport from a bare marker.
pub const MARKER_VIEW_RADIUS: f64 = 100.0;

/// Circular region descriptor: centre on the world plane plus radius.
///
/// # Examples
/// ```
/// use waymark_core::{Circle, circle_to_bounds};
///
/// let bounds = circle_to_bounds(&Circle::new(5.0, 10.0, 250.0));
/// assert_eq!(bounds.min().x, -245.0);
/// assert_eq!(bounds.max().y, 260.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Centre world X.
    pub x: f64,
    /// Centre world Z.
    pub z: f64,
    /// Radius in blocks.
    pub radius: f64,
}

impl Circle {
    /// Construct a circle from centre coordinates and radius.
    #[must_use]
    pub fn new(x: f64, z: f64, radius: f64) -> Self {
        Self { x, z, radius }
    }

    /// Centre as a plane coordinate.
    #[must_use]
    pub fn centre(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.z,
        }
    }
}

/// The visible map region, in either of its interchangeable forms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Viewport {
    /// Centre-plus-radius form, as encoded by the `c` fragment key.
    Circle(Circle),
    /// Axis-aligned bounds, as derived from legacy fragments or geometry.
    Bounds(Rect<f64>),
}

impl Viewport {
    /// Rectangular bounds of the region.
    #[must_use]
    pub fn bounds(&self) -> Rect<f64> {
        match self {
            Self::Circle(circle) => circle_to_bounds(circle),
            Self::Bounds(bounds) => *bounds,
        }
    }

    /// Circular description of the region.
    #[must_use]
    pub fn circle(&self) -> Circle {
        match self {
            Self::Circle(circle) => *circle,
            Self::Bounds(bounds) => bounds_to_circle(bounds),
        }
    }
}

/// Convert a circular region to square bounds of half-width `radius`.
#[must_use]
pub fn circle_to_bounds(circle: &Circle) -> Rect<f64> {
    Rect::new(
        Coord {
            x: circle.x - circle.radius,
            y: circle.z - circle.radius,
        },
        Coord {
            x: circle.x + circle.radius,
            y: circle.z + circle.radius,
        },
    )
}

/// Convert rectangular bounds to the circle centred on them.
///
/// The radius is half the larger span, so the circle's own square bounds
/// still cover the rectangle.
#[must_use]
pub fn bounds_to_circle(bounds: &Rect<f64>) -> Circle {
    let centre = bounds.center();
    Circle {
        x: centre.x,
        z: centre.y,
        radius: bounds.width().max(bounds.height()) / 2.0,
    }
}

/// Bounding circle of a feature's geometry.
///
/// Markers get [`MARKER_VIEW_RADIUS`]; rings and images take the circle of
/// their bounding box. An empty ring collapses to the origin at marker
/// radius.
#[must_use]
pub fn feature_circle(geometry: &Geometry) -> Circle {
    match geometry {
        Geometry::Marker { position } => Circle {
            x: position.x,
            z: position.y,
            radius: MARKER_VIEW_RADIUS,
        },
        Geometry::Polygon { positions } => ring_bounds(positions)
            .map_or(Circle::new(0.0, 0.0, MARKER_VIEW_RADIUS), |bounds| {
                bounds_to_circle(&bounds)
            }),
        Geometry::Image { bounds, .. } => bounds_to_circle(bounds),
    }
}

/// Axis-aligned viewport bounds enclosing a feature's geometry.
#[must_use]
pub fn feature_view_bounds(geometry: &Geometry) -> Rect<f64> {
    circle_to_bounds(&feature_circle(geometry))
}

fn ring_bounds(positions: &[Coord<f64>]) -> Option<Rect<f64>> {
    let (first, rest) = positions.split_first()?;
    let mut min = *first;
    let mut max = *first;
    for corner in rest {
        min.x = min.x.min(corner.x);
        min.y = min.y.min(corner.y);
        max.x = max.x.max(corner.x);
        max.y = max.y.max(corner.y);
    }
    Some(Rect::new(min, max))
}
