//! Decoder for SnitchMaster CSV exports.
//!
//! Each line is positional: `x,y,z,world,source,group,name,cull`. A snitch
//! watches a square of ground around its block, so every row becomes a
//! polygon feature rather than a point marker.

use geo::Coord;
use serde_json::Value;
use waymark_core::{Feature, Geometry};

use super::schema::{self, Coerce, FieldSpec, LineError};
use super::{Decoded, ImportError};

const SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("x", Coerce::Int),
    FieldSpec::required("y", Coerce::Int),
    FieldSpec::required("z", Coerce::Int),
    FieldSpec::required("world", Coerce::Text),
    FieldSpec::required("source", Coerce::Text),
    FieldSpec::required("group", Coerce::Text),
    FieldSpec::required("name", Coerce::Text),
    FieldSpec::optional("cull", Coerce::Float),
];

pub(super) fn decode(_name: &str, text: &str) -> Result<Decoded, ImportError> {
    let mut features = Vec::new();
    for line in text.lines().filter(|line| !line.is_empty()) {
        match snitch_feature(line) {
            Ok(feature) => features.push(feature),
            Err(error) => log::warn!("skipping snitch line {line:?}: {error}"),
        }
    }
    Ok(Decoded::Features(features))
}

fn snitch_feature(line: &str) -> Result<Feature, LineError> {
    let mut properties = schema::parse_positional_line(line, SCHEMA)?;
    let x = schema::int_field(&properties, "x")?;
    let y = schema::int_field(&properties, "y")?;
    let z = schema::int_field(&properties, "z")?;
    let group = schema::text_field(&properties, "group")?.to_owned();

    properties.insert("is_snitch".to_owned(), Value::Bool(true));
    properties.insert("from_snitchmaster".to_owned(), Value::Bool(true));

    // The snitch field is 23 blocks a side; +12 closes the far edge of the
    // final block.
    let (west, east) = (x as f64 - 11.0, x as f64 + 12.0);
    let (north, south) = (z as f64 - 11.0, z as f64 + 12.0);
    let positions = vec![
        Coord { x: west, y: north },
        Coord { x: west, y: south },
        Coord { x: east, y: south },
        Coord { x: east, y: north },
    ];

    let id = format!("dragdrop-snitchmaster-{x},{y},{z},{group}");
    Ok(Feature::new(id, Geometry::Polygon { positions }).with_properties(properties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const EXPORT: &str = "\
4,64,-20,world,jukealert,alpha,gate,672.5

not,enough,fields
-100,30,7,world,jukealert,beta,vault
";

    fn decoded_features(text: &str) -> Vec<Feature> {
        match decode("Snitches.csv", text).expect("decode never fails outright") {
            Decoded::Features(features) => features,
            Decoded::Collection(_) => panic!("snitches decode to features"),
        }
    }

    #[rstest]
    fn rows_become_snitch_fields_and_bad_rows_are_skipped() {
        let features = decoded_features(EXPORT);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id.as_str(), "dragdrop-snitchmaster-4,64,-20,alpha");
        assert_eq!(features[1].id.as_str(), "dragdrop-snitchmaster--100,30,7,beta");
    }

    #[rstest]
    fn the_field_ring_is_a_closed_23_block_square() {
        let features = decoded_features(EXPORT);
        let Geometry::Polygon { positions } = &features[0].geometry else {
            panic!("snitches are polygons");
        };
        assert_eq!(
            positions,
            &vec![
                Coord { x: -7.0, y: -31.0 },
                Coord { x: -7.0, y: -8.0 },
                Coord { x: 16.0, y: -8.0 },
                Coord { x: 16.0, y: -31.0 },
            ]
        );
    }

    #[rstest]
    fn properties_carry_the_row_and_the_source_tags() {
        let features = decoded_features(EXPORT);
        let properties = &features[0].properties;
        assert_eq!(properties.get("is_snitch"), Some(&json!(true)));
        assert_eq!(properties.get("from_snitchmaster"), Some(&json!(true)));
        assert_eq!(properties.get("group"), Some(&json!("alpha")));
        assert_eq!(properties.get("name"), Some(&json!("gate")));
        assert_eq!(properties.get("cull"), Some(&json!(672.5)));

        // The cull timer is optional; the second row has none.
        assert!(!features[1].properties.contains_key("cull"));
    }
}
