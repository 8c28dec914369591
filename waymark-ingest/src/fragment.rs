//! URL fragment codec.
//!
//! The fragment after `#` is the shareable face of the map state: a centre
//! entry plus optional basemap, feature selection, and inline payloads,
//! each written as `key=value` and separated by further `#` characters.
//! Two generations of links are read. The current grammar is the keyed
//! form; the legacy form is a bare `{x}x/{z}z/{zoom}` path from before the
//! keys existed, kept parseable so old bookmarks still land somewhere
//! sensible. Only the current grammar is ever written.
//!
//! Parsing is total: a malformed entry is logged and dropped, never an
//! error, because a shared link should show the map even when one entry in
//! it has rotted.

use std::sync::OnceLock;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use waymark_core::{Circle, Feature, FeatureId, MARKER_VIEW_RADIUS, Viewport, circle_to_bounds};

/// Characters percent-encoded inside inline JSON payloads.
///
/// `#` would split the entry, `%` would start a stray escape, and the rest
/// are characters user agents refuse to carry verbatim in a fragment.
const INLINE_JSON: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Map state carried by a URL fragment.
///
/// Every part is optional; [`parse_fragment`] fills in whatever the link
/// provides and leaves the rest unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlState {
    /// Requested basemap name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basemap: Option<String>,
    /// Requested viewport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// The viewport denotes a dropped pin rather than a view radius the
    /// author chose.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub marker: bool,
    /// Collection document to fetch and load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_url: Option<String>,
    /// Feature to select once loading settles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<FeatureId>,
    /// Feature carried inline in the link itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<Feature>,
    /// Collection document carried inline, still to be validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Value>,
}

/// Parse a URL fragment into map state.
///
/// Accepts the fragment with or without its leading `#`. Legacy
/// `{x}x/{z}z/{zoom}` links are recognised first; anything else is read as
/// `#`-separated `key=value` entries. Unknown keys and malformed values
/// are logged and skipped.
pub fn parse_fragment(fragment: &str) -> UrlState {
    let text = fragment.strip_prefix('#').unwrap_or(fragment);
    if text.is_empty() {
        return UrlState::default();
    }
    if let Some(state) = parse_legacy(text) {
        return state;
    }
    parse_entries(text)
}

/// Serialise map state as a URL fragment, leading `#` included.
///
/// Entries are written in a fixed order so equal states produce equal
/// links. A marker at the default view radius is written as a bare centre,
/// which is how [`parse_fragment`] recognises it again.
#[must_use]
pub fn serialise_fragment(state: &UrlState) -> String {
    let mut entries = Vec::new();

    if let Some(viewport) = &state.viewport {
        let Circle { x, z, radius } = viewport.circle();
        if state.marker && radius == MARKER_VIEW_RADIUS {
            entries.push(format!("c={x},{z}"));
        } else {
            entries.push(format!("c={x},{z},r{radius}"));
        }
    }
    if let Some(basemap) = &state.basemap {
        entries.push(format!("b={basemap}"));
    }
    if let Some(feature_id) = &state.feature_id {
        entries.push(format!("f={feature_id}"));
    }
    if let Some(url) = &state.collection_url {
        entries.push(format!("u={url}"));
    }
    if let Some(feature) = &state.feature {
        encode_inline(&mut entries, "feature", feature);
    }
    if let Some(collection) = &state.collection {
        encode_inline(&mut entries, "collection", collection);
    }

    format!("#{}", entries.join("#"))
}

fn legacy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([-0-9]+)x?/([-0-9]+)z?/?([-0-9]*)").expect("hard-coded pattern compiles")
    })
}

/// Legacy `{x}x/{z}z/{zoom}` links; zoom halves the view span per step,
/// starting from a 500-block radius.
fn parse_legacy(text: &str) -> Option<UrlState> {
    let captures = legacy_pattern().captures(text)?;
    let x: f64 = captures.get(1)?.as_str().parse().ok()?;
    let z: f64 = captures.get(2)?.as_str().parse().ok()?;
    let zoom_text = captures.get(3).map_or("", |m| m.as_str());
    let zoom: f64 = if zoom_text.is_empty() {
        0.0
    } else {
        zoom_text.parse().ok()?
    };

    let radius = (-zoom).exp2() * 500.0;
    Some(UrlState {
        viewport: Some(Viewport::Bounds(circle_to_bounds(&Circle::new(x, z, radius)))),
        ..UrlState::default()
    })
}

fn parse_entries(text: &str) -> UrlState {
    let mut state = UrlState::default();
    for entry in text.split('#').filter(|entry| !entry.is_empty()) {
        let Some((key, value)) = entry.split_once('=') else {
            log::warn!("unknown url fragment entry {entry:?}");
            continue;
        };
        match key {
            "c" => parse_centre(value, &mut state),
            // `t` is the spelling older links used for the basemap.
            "b" | "t" => state.basemap = Some(value.to_owned()),
            "f" => state.feature_id = Some(FeatureId::new(value)),
            "u" => state.collection_url = Some(value.to_owned()),
            "feature" => state.feature = decode_inline(value, "feature"),
            "collection" => state.collection = decode_inline(value, "collection"),
            _ => log::warn!("unknown url fragment key {key:?}"),
        }
    }
    state
}

fn centre_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[,r]+").expect("hard-coded pattern compiles"))
}

/// Centre entries look like `12,34,r50`; without a usable radius the entry
/// is a dropped pin shown at the default view radius.
fn parse_centre(value: &str, state: &mut UrlState) {
    let mut pieces = centre_pattern().split(value);
    let x = pieces.next().and_then(|piece| piece.parse::<f64>().ok());
    let z = pieces.next().and_then(|piece| piece.parse::<f64>().ok());
    let (Some(x), Some(z)) = (x, z) else {
        log::warn!("ignoring malformed centre entry {value:?}");
        return;
    };

    let radius = pieces
        .next()
        .and_then(|piece| piece.parse::<f64>().ok())
        .filter(|radius| *radius != 0.0);
    let radius = radius.unwrap_or_else(|| {
        state.marker = true;
        MARKER_VIEW_RADIUS
    });
    state.viewport = Some(Viewport::Circle(Circle::new(x, z, radius)));
}

fn decode_inline<T: DeserializeOwned>(encoded: &str, what: &str) -> Option<T> {
    let text = match percent_decode_str(encoded).decode_utf8() {
        Ok(text) => text,
        Err(error) => {
            log::warn!("ignoring undecodable inline {what}: {error}");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(error) => {
            log::warn!("ignoring malformed inline {what}: {error}");
            None
        }
    }
}

fn encode_inline<T: Serialize>(entries: &mut Vec<String>, key: &str, payload: &T) {
    match serde_json::to_string(payload) {
        Ok(json) => entries.push(format!("{key}={}", utf8_percent_encode(&json, INLINE_JSON))),
        Err(error) => log::warn!("dropping unserialisable inline {key}: {error}"),
    }
}
