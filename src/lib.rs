//! Facade crate for the waymark map-annotation engine.
//!
//! This crate re-exports the canonical feature model and the ingestion entry
//! points so applications can depend on a single crate: decoders for dropped
//! files, the URL-fragment codec, and the load orchestrator that applies
//! derived state to a [`MapStore`].

#![forbid(unsafe_code)]

pub use waymark_core::{
    Circle, CircleMarkerStyle, Collection, CollectionError, CollectionInfo, Feature, FeatureId,
    FeatureStyle, Filter, Geometry, MapStore, MemoryMapStore, Properties, StateUpdate, Viewport,
};

pub use waymark_ingest::{
    CollectionSummary, DroppedFile, FetchError, HttpJsonFetch, ImportError, ImportSummary,
    JsonFetch, LoadReport, Loader, UrlState, import_file, load_collection, parse_fragment,
    serialise_fragment,
};
