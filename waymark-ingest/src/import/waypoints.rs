//! Decoder for VoxelMap waypoint exports.
//!
//! A `.points` export holds one `key:value` CSV line per waypoint, such as
//! `name:home,x:12,y:64,z:-7,red:1.0,green:0.5,blue:0.0,enabled:true`.
//! Lines without an `x:` token are headers or chatter and are ignored. A
//! line that fails the schema is logged and skipped so one mangled waypoint
//! does not sink the rest of the file.

use geo::Coord;
use serde_json::Value;
use waymark_core::{CircleMarkerStyle, Feature, FeatureStyle, Geometry, Properties};

use super::schema::{self, Coerce, FieldSpec, LineError};
use super::{Decoded, ImportError};

const SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("name", Coerce::Text),
    FieldSpec::required("x", Coerce::Int),
    FieldSpec::required("y", Coerce::Int),
    FieldSpec::required("z", Coerce::Int),
    FieldSpec::required("red", Coerce::Float),
    FieldSpec::required("green", Coerce::Float),
    FieldSpec::required("blue", Coerce::Float),
    FieldSpec::optional("enabled", Coerce::Bool),
];

pub(super) fn decode(_name: &str, text: &str) -> Result<Decoded, ImportError> {
    let mut features = Vec::new();
    for line in text.lines().filter(|line| line.contains("x:")) {
        match waypoint_feature(line) {
            Ok(feature) => features.push(feature),
            Err(error) => log::warn!("skipping waypoint line {line:?}: {error}"),
        }
    }
    Ok(Decoded::Features(features))
}

fn waypoint_feature(line: &str) -> Result<Feature, LineError> {
    let mut properties = schema::parse_keyed_line(line, SCHEMA)?;
    let x = schema::int_field(&properties, "x")?;
    let y = schema::int_field(&properties, "y")?;
    let z = schema::int_field(&properties, "z")?;
    let name = schema::text_field(&properties, "name")?.to_owned();
    let colour = css_colour(&properties)?;

    properties.insert("is_voxelmap_waypoint".to_owned(), Value::Bool(true));
    properties.insert("is_waypoint".to_owned(), Value::Bool(true));

    let geometry = Geometry::Marker {
        position: Coord {
            x: x as f64,
            y: z as f64,
        },
    };
    let style = FeatureStyle {
        circle_marker: Some(CircleMarkerStyle {
            radius: 4.0,
            weight: 0.0,
            fill_color: colour.clone(),
            color: colour,
        }),
    };
    Ok(
        Feature::new(format!("dragdrop-voxelmap-waypoint-{x},{y},{z},{name}"), geometry)
            .with_properties(properties)
            .with_style(style),
    )
}

/// Colour channels arrive as unit floats; CSS wants 8-bit `rgb(...)`.
fn css_colour(properties: &Properties) -> Result<String, LineError> {
    let channel = |field: &'static str| {
        schema::float_field(properties, field).map(|value| (value * 255.0).round())
    };
    Ok(format!(
        "rgb({},{},{})",
        channel("red")?,
        channel("green")?,
        channel("blue")?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const EXPORT: &str = "\
name:home,x:12,y:64,z:-7,red:1.0,green:0.5,blue:0.0,enabled:true,world:overworld
points exported by VoxelMap
name:broken,x:abc,y:64,z:0,red:0,green:0,blue:0
name:farm,x:-3,y:70,z:210,red:0.0,green:1.0,blue:0.0,enabled:false
";

    fn decoded_features(text: &str) -> Vec<Feature> {
        match decode("voxelMap.points", text).expect("decode never fails outright") {
            Decoded::Features(features) => features,
            Decoded::Collection(_) => panic!("waypoints decode to features"),
        }
    }

    #[rstest]
    fn bad_lines_are_skipped_and_good_ones_kept() {
        let features = decoded_features(EXPORT);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id.as_str(), "dragdrop-voxelmap-waypoint-12,64,-7,home");
        assert_eq!(features[1].id.as_str(), "dragdrop-voxelmap-waypoint--3,70,210,farm");
    }

    #[rstest]
    fn markers_sit_on_the_ground_plane() {
        let features = decoded_features(EXPORT);
        let Geometry::Marker { position } = features[0].geometry else {
            panic!("waypoints are markers");
        };
        assert_eq!(position, Coord { x: 12.0, y: -7.0 });
    }

    #[rstest]
    fn style_and_tags_survive_the_trip() {
        let features = decoded_features(EXPORT);
        let style = features[0].style.as_ref().expect("waypoints are styled");
        let marker = style.circle_marker.as_ref().expect("circle marker style");
        assert_eq!(marker.fill_color, "rgb(255,128,0)");
        assert_eq!(marker.color, "rgb(255,128,0)");
        assert_eq!(marker.radius, 4.0);
        assert_eq!(marker.weight, 0.0);

        let properties = &features[0].properties;
        assert_eq!(properties.get("is_voxelmap_waypoint"), Some(&json!(true)));
        assert_eq!(properties.get("is_waypoint"), Some(&json!(true)));
        assert_eq!(properties.get("world"), Some(&json!("overworld")));
        assert_eq!(properties.get("enabled"), Some(&json!(true)));
    }

    #[rstest]
    fn a_line_without_an_enabled_token_reads_disabled() {
        let features =
            decoded_features("name:camp,x:900,y:64,z:33,red:0.2,green:0.2,blue:1.0\n");
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].properties.get("enabled"), Some(&json!(false)));
    }
}
