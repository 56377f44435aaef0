//! TopoJSON decoding into the feature model.

use crate::error::LoadError;
use crate::map::model::{GeoCollection, GeoFeature, MultiPolygon, Polygon, Ring};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Object read when the topology has one named like this
pub const COUNTRIES_OBJECT: &str = "countries";

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub objects: Map<String, Value>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
}

/// Quantization transform: `position = quantized * scale + translate`
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    #[serde(other)]
    Unsupported,
}

impl Topology {
    /// Absolute arc coordinates, undoing delta encoding when quantized
    fn decoded_arcs(&self) -> Vec<Ring> {
        self.arcs
            .iter()
            .map(|arc| match self.transform {
                Some(Transform { scale, translate }) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    arc.iter()
                        .filter(|p| p.len() >= 2)
                        .map(|p| {
                            x += p[0];
                            y += p[1];
                            (x * scale[0] + translate[0], y * scale[1] + translate[1])
                        })
                        .collect()
                }
                None => arc
                    .iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| (p[0], p[1]))
                    .collect(),
            })
            .collect()
    }

    /// Features of the `countries` object, or of the first object
    pub fn features(&self) -> Result<GeoCollection, LoadError> {
        let (name, object) = match self.objects.get_key_value(COUNTRIES_OBJECT) {
            Some(entry) => entry,
            None => self
                .objects
                .iter()
                .next()
                .ok_or_else(|| LoadError::Topology("topology has no objects".into()))?,
        };
        debug!(object = %name, "decoding topology object");

        let geometry: TopoGeometry = serde_json::from_value(object.clone())
            .map_err(|e| LoadError::Topology(format!("object {name}: {e}")))?;
        let arcs = self.decoded_arcs();

        let members = match geometry {
            TopoGeometry::GeometryCollection { geometries } => geometries,
            single => vec![single],
        };

        let mut collection = Vec::with_capacity(members.len());
        for member in members {
            match member {
                TopoGeometry::Polygon { arcs: rings, properties } => {
                    let polygon = stitch_polygon(&rings, &arcs)?;
                    collection.push(GeoFeature::new(feature_name(properties.as_ref()), vec![polygon]));
                }
                TopoGeometry::MultiPolygon { arcs: polygons, properties } => {
                    let geometry = polygons
                        .iter()
                        .map(|rings| stitch_polygon(rings, &arcs))
                        .collect::<Result<MultiPolygon, _>>()?;
                    collection.push(GeoFeature::new(feature_name(properties.as_ref()), geometry));
                }
                TopoGeometry::GeometryCollection { .. } | TopoGeometry::Unsupported => {
                    warn!(object = %name, "skipping non-polygon geometry");
                }
            }
        }
        Ok(collection)
    }
}

pub(crate) fn feature_name(properties: Option<&Map<String, Value>>) -> String {
    match properties.and_then(|p| p.get("name")).and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => {
            debug!("feature without a name property");
            String::new()
        }
    }
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Ring]) -> Result<Polygon, LoadError> {
    rings.iter().map(|ring| stitch_ring(ring, arcs)).collect()
}

/// Concatenate arcs into one ring. A negative index `i` means arc `!i`
/// traversed backwards; each arc after the first drops its first vertex,
/// which it shares with the previous arc's last.
fn stitch_ring(indices: &[i64], arcs: &[Ring]) -> Result<Ring, LoadError> {
    let mut ring: Ring = Vec::new();
    for &index in indices {
        let (slot, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| LoadError::Topology(format!("arc index {index} out of range")))?;

        let skip = usize::from(!ring.is_empty());
        if reversed {
            ring.extend(arc.iter().rev().skip(skip));
        } else {
            ring.extend(arc.iter().skip(skip));
        }
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square_topology(transform: Value) -> Topology {
        serde_json::from_value(json!({
            "type": "Topology",
            "transform": transform,
            "objects": {
                "land": { "type": "GeometryCollection", "geometries": [] },
                "countries": {
                    "type": "GeometryCollection",
                    "geometries": [
                        { "type": "Polygon", "arcs": [[0, 1]], "properties": { "name": "Forward" } },
                        { "type": "MultiPolygon", "arcs": [[[-2, -1]]], "properties": { "name": "Backward" } },
                        { "type": "Point", "coordinates": [0, 0] },
                        { "type": "Polygon", "arcs": [[0, 1]] }
                    ]
                }
            },
            "arcs": [
                [[0, 0], [10, 0], [0, 10]],
                [[10, 10], [-10, 0], [0, -10]]
            ]
        }))
        .unwrap()
    }

    fn identity() -> Value {
        json!({ "scale": [1, 1], "translate": [0, 0] })
    }

    #[test]
    fn test_delta_decoding_and_stitching() {
        let features = square_topology(identity()).features().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].name, "Forward");
        assert_eq!(
            features[0].geometry,
            vec![vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]]]
        );
        assert!(features[0].pop_density.is_none());
    }

    #[test]
    fn test_negative_indices_reverse_arcs() {
        let features = square_topology(identity()).features().unwrap();
        assert_eq!(features[1].name, "Backward");
        assert_eq!(
            features[1].geometry,
            vec![vec![vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]]]
        );
    }

    #[test]
    fn test_transform_applies_after_accumulation() {
        let topology = square_topology(json!({ "scale": [0.5, 2], "translate": [-10, 5] }));
        let features = topology.features().unwrap();
        assert_eq!(features[0].geometry[0][0][2], (-5.0, 25.0));
    }

    #[test]
    fn test_missing_name_is_empty() {
        let features = square_topology(identity()).features().unwrap();
        assert_eq!(features[2].name, "");
    }

    #[test]
    fn test_without_transform_positions_are_absolute() {
        let topology: Topology = serde_json::from_value(json!({
            "type": "Topology",
            "objects": {
                "shapes": { "type": "Polygon", "arcs": [[0]], "properties": { "name": "Tri" } }
            },
            "arcs": [[[1.5, 2.5], [3.0, 2.5], [1.5, 4.0], [1.5, 2.5]]]
        }))
        .unwrap();
        let features = topology.features().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].geometry[0][0][1], (3.0, 2.5));
    }

    #[test]
    fn test_bad_arc_index() {
        let topology: Topology = serde_json::from_value(json!({
            "type": "Topology",
            "objects": { "countries": { "type": "Polygon", "arcs": [[5]] } },
            "arcs": []
        }))
        .unwrap();
        assert!(matches!(topology.features(), Err(LoadError::Topology(_))));
    }
}
