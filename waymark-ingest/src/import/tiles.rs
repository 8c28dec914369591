//! Decoder for JourneyMap region tiles.
//!
//! A tile file is named after its region coordinates, `{rx},{rz}.png`, and
//! covers a 512-block square. The pixels are never parsed; the file is
//! re-encoded as a data URL and laid on the map as an image overlay.

use std::sync::OnceLock;

use geo::{Coord, Rect};
use regex::Regex;
use serde_json::Value;
use waymark_core::{Feature, Geometry, Properties};

use super::{Decoded, ImportError};

/// Blocks covered by one region tile along each axis.
const TILE_SPAN: f64 = 512.0;

fn tile_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([-0-9]+),([-0-9]+)\.png").expect("hard-coded pattern compiles")
    })
}

/// Region coordinates from a tile file name, if it looks like one.
///
/// The pattern floats, so decorated names such as `backup 5,-2.png` still
/// count as tiles.
pub(super) fn tile_coordinates(name: &str) -> Option<(i64, i64)> {
    let captures = tile_name_pattern().captures(name)?;
    let rx = captures.get(1)?.as_str().parse().ok()?;
    let rz = captures.get(2)?.as_str().parse().ok()?;
    Some((rx, rz))
}

pub(super) fn is_tile_name(name: &str) -> bool {
    tile_coordinates(name).is_some()
}

pub(super) fn decode(name: &str, data_url: &str) -> Result<Decoded, ImportError> {
    let (rx, rz) = tile_coordinates(name).ok_or_else(|| ImportError::TileName {
        name: name.to_owned(),
    })?;

    // An index can fit i64 while its scaled block coordinate does not, so
    // the bounds are computed as floats.
    let north = rz as f64 * TILE_SPAN;
    let west = rx as f64 * TILE_SPAN;
    let bounds = Rect::new(
        Coord { x: west, y: north },
        Coord {
            x: west + TILE_SPAN,
            y: north + TILE_SPAN,
        },
    );

    let id = format!("dragdrop-journeymap-tile-{rx}-{rz}");
    let mut properties = Properties::new();
    properties.insert("is_journeymap_tile".to_owned(), Value::Bool(true));
    properties.insert("name".to_owned(), Value::from(id.clone()));

    let feature = Feature::new(
        id,
        Geometry::Image {
            url: data_url.to_owned(),
            bounds,
        },
    )
    .with_properties(properties);
    Ok(Decoded::Features(vec![feature]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("5,-2.png", Some((5, -2)))]
    #[case("backup 5,-2.png", Some((5, -2)))]
    #[case("-1,-1.png", Some((-1, -1)))]
    #[case("99999999999999999,0.png", Some((99_999_999_999_999_999, 0)))]
    #[case("5,-2.jpg", None)]
    #[case("notes.txt", None)]
    fn tile_names_are_recognised_by_shape(
        #[case] name: &str,
        #[case] expected: Option<(i64, i64)>,
    ) {
        assert_eq!(tile_coordinates(name), expected);
        assert_eq!(is_tile_name(name), expected.is_some());
    }

    #[rstest]
    fn a_tile_covers_its_512_block_region() {
        let url = "data:image/png;base64,AAAA";
        let decoded = decode("5,-2.png", url).expect("tile name is valid");
        let Decoded::Features(features) = decoded else {
            panic!("tiles decode to features");
        };
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature.id.as_str(), "dragdrop-journeymap-tile-5--2");
        let Geometry::Image { url: stored, bounds } = &feature.geometry else {
            panic!("tiles are image overlays");
        };
        assert_eq!(stored, url);
        assert_eq!(bounds.min(), Coord { x: 2560.0, y: -1024.0 });
        assert_eq!(bounds.max(), Coord { x: 3072.0, y: -512.0 });
        assert_eq!(
            feature.properties.get("name").and_then(|name| name.as_str()),
            Some("dragdrop-journeymap-tile-5--2")
        );
    }

    #[rstest]
    fn an_extreme_region_index_keeps_finite_bounds() {
        let decoded = decode("99999999999999999,0.png", "data:image/png;base64,AAAA")
            .expect("any index that fits i64 decodes");
        let Decoded::Features(features) = decoded else {
            panic!("tiles decode to features");
        };

        let feature = &features[0];
        assert_eq!(feature.id.as_str(), "dragdrop-journeymap-tile-99999999999999999-0");
        let Geometry::Image { bounds, .. } = &feature.geometry else {
            panic!("tiles are image overlays");
        };
        for edge in [bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y] {
            assert!(edge.is_finite());
        }
        assert_eq!(bounds.min().x, 99_999_999_999_999_999f64 * 512.0);
    }

    #[rstest]
    fn a_misnamed_file_is_reported_not_guessed() {
        let error = decode("notes.txt", "data:application/octet-stream;base64,")
            .expect_err("name carries the coordinates, so it must parse");
        assert!(matches!(error, ImportError::TileName { ref name } if name == "notes.txt"));
    }
}
