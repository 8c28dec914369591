//! Orchestration from parsed link state to store updates.
//!
//! A link can name several things at once: a basemap, a remote collection,
//! an inline collection, an inline feature, a selection, and a viewport.
//! [`Loader::apply_url_state`] walks them in a fixed order so the pieces
//! compose: collections land before the selection looks anything up, and
//! an explicit viewport is applied last so it beats one derived from the
//! selected feature.
//!
//! The loader is not transactional. Whatever failed is logged and noted in
//! the [`LoadReport`]; everything else still lands, because a link with
//! one dead entry should still show the rest of the map.

use std::cell::Cell;

use serde_json::Value;
use waymark_core::{
    Collection, CollectionError, FeatureId, MapStore, StateUpdate, Viewport, feature_view_bounds,
};

use crate::fragment::UrlState;
use crate::net::{FetchError, JsonFetch};

/// Source label for collections carried inline in the fragment.
const INLINE_SOURCE: &str = "#";

/// Where a loaded collection came from and what it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    /// URL, `#` for inline documents, or `drag-drop` for files.
    pub source: String,
    /// Features loaded.
    pub features: usize,
    /// Filters decoded; they are counted but never auto-applied.
    pub filters: usize,
}

/// A collection document that failed validation.
#[derive(Debug)]
pub struct RejectedCollection {
    /// Source label of the rejected document.
    pub source: String,
    /// Why it was rejected.
    pub error: CollectionError,
}

/// What one [`Loader::apply_url_state`] run did and did not manage.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Collections loaded, in the order they landed.
    pub collections: Vec<CollectionSummary>,
    /// Collections that failed validation.
    pub rejected: Vec<RejectedCollection>,
    /// Failure fetching the remote collection, if one was named.
    pub fetch_error: Option<FetchError>,
    /// Requested selection that no loaded collection contains.
    pub missing_feature: Option<FeatureId>,
    /// A newer run took over at this run's await point; later steps were
    /// skipped.
    pub superseded: bool,
}

/// Validate a collection document and load its features into the store.
///
/// Features land as one batch. Filters are decoded and counted but not
/// applied; activating them is a display concern.
///
/// # Errors
///
/// Everything [`Collection::from_value`] can report; on error the store is
/// untouched.
pub fn load_collection(
    document: &Value,
    store: &mut dyn MapStore,
    source: &str,
) -> Result<CollectionSummary, CollectionError> {
    let collection = Collection::from_value(document)?;
    let summary = CollectionSummary {
        source: source.to_owned(),
        features: collection.features.len(),
        filters: collection.filters.len(),
    };
    store.apply(StateUpdate::LoadFeatures(collection.features));
    log::info!(
        "loaded collection with {} features and {} filters from {}",
        summary.features,
        summary.filters,
        summary.source
    );
    Ok(summary)
}

/// Applies parsed link state to a store, fetching remote collections as
/// needed.
///
/// Runs supersede each other: starting a new [`Loader::apply_url_state`]
/// call invalidates any older run still parked at its fetch, so a stale
/// response can never clobber state a newer link has set up.
#[derive(Debug)]
pub struct Loader<F: JsonFetch> {
    fetch: F,
    generation: Cell<u64>,
}

impl<F: JsonFetch> Loader<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            generation: Cell::new(0),
        }
    }

    /// Apply everything `state` names, in composition order.
    ///
    /// Basemap first, then collections (remote, then inline), then the
    /// inline feature, then the selection with its derived viewport, and
    /// an explicit viewport last. The returned report says what loaded,
    /// what was rejected, and whether a newer run cut this one short.
    pub async fn apply_url_state(&self, state: &UrlState, store: &mut dyn MapStore) -> LoadReport {
        let token = self.generation.get().wrapping_add(1);
        self.generation.set(token);
        let mut report = LoadReport::default();

        if let Some(basemap) = &state.basemap {
            store.apply(StateUpdate::SetBasemap(basemap.clone()));
        }

        if let Some(url) = &state.collection_url {
            match self.fetch.fetch_json(url).await {
                Ok(document) => {
                    if self.superseded(token) {
                        log::info!("discarding {url}: a newer link took over while fetching");
                        report.superseded = true;
                        return report;
                    }
                    record_collection(&document, store, url, &mut report);
                }
                Err(error) => {
                    log::error!("could not fetch collection from {url}: {error}");
                    report.fetch_error = Some(error);
                    if self.superseded(token) {
                        report.superseded = true;
                        return report;
                    }
                }
            }
        }

        if let Some(document) = &state.collection {
            record_collection(document, store, INLINE_SOURCE, &mut report);
        }

        if let Some(feature) = &state.feature {
            store.apply(StateUpdate::AddFeature(feature.clone()));
        }

        let selected = state
            .feature
            .as_ref()
            .map(|feature| feature.id.clone())
            .or_else(|| state.feature_id.clone());
        if let Some(id) = selected {
            match store.get_feature(&id) {
                Some(found) => {
                    store.apply(StateUpdate::SelectFeature(id));
                    if state.viewport.is_none() {
                        store.apply(StateUpdate::SetViewport(Viewport::Bounds(
                            feature_view_bounds(&found.geometry),
                        )));
                    }
                }
                None => {
                    log::warn!("feature {id} is not in any loaded collection");
                    report.missing_feature = Some(id);
                }
            }
        }

        if let Some(viewport) = &state.viewport {
            store.apply(StateUpdate::SetViewport(*viewport));
        }

        report
    }

    fn superseded(&self, token: u64) -> bool {
        self.generation.get() != token
    }
}

fn record_collection(
    document: &Value,
    store: &mut dyn MapStore,
    source: &str,
    report: &mut LoadReport,
) {
    match load_collection(document, store, source) {
        Ok(summary) => report.collections.push(summary),
        Err(error) => {
            log::error!("rejecting collection from {source}: {error}");
            report.rejected.push(RejectedCollection {
                source: source.to_owned(),
                error,
            });
        }
    }
}
