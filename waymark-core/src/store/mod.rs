//! State port between load orchestration and the owning application.
//!
//! [`MapStore`] is the explicit state-transition interface: callers query
//! the one piece of state load orchestration needs (feature lookup by id)
//! and submit discrete, named [`StateUpdate`] records. Updates take effect
//! in submission order and each is atomic from the caller's point of view.
//! No ambient global is touched, so tests substitute an in-memory store
//! freely.

mod memory;

pub use memory::MemoryMapStore;

use crate::feature::{Feature, FeatureId};
use crate::geom::Viewport;

/// One discrete, named state mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// Switch the active basemap.
    SetBasemap(String),
    /// Move the visible region.
    SetViewport(Viewport),
    /// Load a batch of features, keyed by id.
    LoadFeatures(Vec<Feature>),
    /// Add or replace a single feature.
    AddFeature(Feature),
    /// Open a feature's detail view.
    SelectFeature(FeatureId),
}

/// Mutable application state as seen by load orchestration.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use waymark_core::{Feature, Geometry, MapStore, MemoryMapStore, StateUpdate};
///
/// let mut store = MemoryMapStore::new();
/// let feature = Feature::new(
///     "spawn",
///     Geometry::Marker {
///         position: Coord { x: 0.0, y: 0.0 },
///     },
/// );
/// store.apply(StateUpdate::AddFeature(feature.clone()));
///
/// assert_eq!(store.get_feature(&"spawn".into()), Some(feature));
/// assert_eq!(store.get_feature(&"elsewhere".into()), None);
/// ```
pub trait MapStore {
    /// Look up a feature in the current state.
    fn get_feature(&self, id: &FeatureId) -> Option<Feature>;

    /// Apply one update; updates take effect in submission order.
    fn apply(&mut self, update: StateUpdate);
}
