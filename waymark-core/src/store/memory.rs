//! Ordered in-memory map state.

use std::collections::BTreeMap;

use crate::collection::Collection;
use crate::feature::{Feature, FeatureId};
use crate::geom::Viewport;

use super::{MapStore, StateUpdate};

/// In-memory [`MapStore`] keyed by feature id.
///
/// Loading a feature whose id is already present overwrites the previous
/// value, which is what makes deterministic decoder ids idempotent on
/// re-import. Iteration and export follow id order, so repeated exports of
/// the same state are byte-identical.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryMapStore {
    features: BTreeMap<FeatureId, Feature>,
    basemap: Option<String>,
    viewport: Option<Viewport>,
    selected: Option<FeatureId>,
}

impl MemoryMapStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the store holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate features in id order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Active basemap, when one has been applied.
    #[must_use]
    pub fn basemap(&self) -> Option<&str> {
        self.basemap.as_deref()
    }

    /// Current viewport, when one has been applied.
    #[must_use]
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Currently selected feature id.
    #[must_use]
    pub fn selected(&self) -> Option<&FeatureId> {
        self.selected.as_ref()
    }

    /// Export the held features as a collection document.
    #[must_use]
    pub fn to_collection(&self) -> Collection {
        Collection::new(self.features.values().cloned().collect(), vec![])
    }
}

impl MapStore for MemoryMapStore {
    fn get_feature(&self, id: &FeatureId) -> Option<Feature> {
        self.features.get(id).cloned()
    }

    fn apply(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::SetBasemap(basemap) => self.basemap = Some(basemap),
            StateUpdate::SetViewport(viewport) => self.viewport = Some(viewport),
            StateUpdate::LoadFeatures(features) => {
                for feature in features {
                    self.features.insert(feature.id.clone(), feature);
                }
            }
            StateUpdate::AddFeature(feature) => {
                self.features.insert(feature.id.clone(), feature);
            }
            StateUpdate::SelectFeature(id) => self.selected = Some(id),
        }
    }
}
