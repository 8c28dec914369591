//! Core domain model for the waymark map-annotation engine.
//!
//! The types here are the canonical feature schema every ingestion path
//! normalises into: [`Feature`] records with tagged [`Geometry`] variants,
//! versioned [`Collection`] bundles, viewport geometry helpers, and the
//! [`MapStore`] port through which orchestration mutates application
//! state. Wire formats are fixed by the existing ecosystem and documented
//! on each type; validation lives in constructors so downstream components
//! stay honest.

#![forbid(unsafe_code)]

pub mod collection;
pub mod feature;
pub mod geom;
pub mod store;

pub use collection::{COLLECTION_VERSION, Collection, CollectionError, CollectionInfo, Filter};
pub use feature::{CircleMarkerStyle, Feature, FeatureId, FeatureStyle, Geometry, Properties};
pub use geom::{
    Circle, MARKER_VIEW_RADIUS, Viewport, bounds_to_circle, circle_to_bounds, feature_circle,
    feature_view_bounds,
};
pub use store::{MapStore, MemoryMapStore, StateUpdate};
