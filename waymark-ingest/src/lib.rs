//! Ingestion for Waymark map state.
//!
//! Everything that turns outside input into store updates lives here:
//! decoders for dropped files ([`import_file`]), the URL fragment codec
//! ([`parse_fragment`] and [`serialise_fragment`]), collection validation
//! and loading ([`load_collection`]), and the link orchestrator
//! ([`Loader`]) that composes the lot against any
//! [`waymark_core::MapStore`].
//!
//! Network access goes through the [`JsonFetch`] port. [`HttpJsonFetch`]
//! is the reqwest-backed implementation; [`net::test_support::StubFetch`]
//! is the scripted one for tests.

#![forbid(unsafe_code)]

pub mod files;
pub mod fragment;
pub mod import;
pub mod loader;
pub mod net;

pub use files::{DiskFile, DroppedFile, FileReadError, MemoryFile, data_url};
pub use fragment::{UrlState, parse_fragment, serialise_fragment};
pub use import::{ImportError, ImportSummary, import_file};
pub use loader::{CollectionSummary, LoadReport, Loader, RejectedCollection, load_collection};
pub use net::{
    DEFAULT_USER_AGENT, FetchBuildError, FetchError, HttpJsonFetch, HttpJsonFetchConfig, JsonFetch,
};
