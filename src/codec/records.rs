//! Wire records for hits, anchors and local transformations

use crate::api::types::{ApiError, ApiResult};
use crate::codec::pose::{flatten, flatten_with_scale, FlatTransform};
use crate::codec::trackable::{HitResult, Trackable};
use crate::core::{
    AnchorHandle, Pose, Scale, ANCHOR_TYPE_GEOSPATIAL, ANCHOR_TYPE_PLANE, ANCHOR_TYPE_UNDEFINED,
    HIT_TYPE_PLANE, HIT_TYPE_POINT, HIT_TYPE_UNDEFINED,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hit classification, encoded on the wire as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum HitKind {
    Undefined,
    Plane,
    Point,
}

impl HitKind {
    pub fn code(&self) -> u8 {
        match self {
            HitKind::Undefined => HIT_TYPE_UNDEFINED,
            HitKind::Plane => HIT_TYPE_PLANE,
            HitKind::Point => HIT_TYPE_POINT,
        }
    }
}

impl From<HitKind> for u8 {
    fn from(kind: HitKind) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for HitKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            HIT_TYPE_UNDEFINED => Ok(HitKind::Undefined),
            HIT_TYPE_PLANE => Ok(HitKind::Plane),
            HIT_TYPE_POINT => Ok(HitKind::Point),
            other => Err(format!("unknown hit type code {}", other)),
        }
    }
}

/// Anchor classification, encoded on the wire as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AnchorKind {
    Plane,
    Geospatial,
    Undefined,
}

impl AnchorKind {
    pub fn code(&self) -> u8 {
        match self {
            AnchorKind::Plane => ANCHOR_TYPE_PLANE,
            AnchorKind::Geospatial => ANCHOR_TYPE_GEOSPATIAL,
            AnchorKind::Undefined => ANCHOR_TYPE_UNDEFINED,
        }
    }
}

impl From<AnchorKind> for u8 {
    fn from(kind: AnchorKind) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for AnchorKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            ANCHOR_TYPE_PLANE => Ok(AnchorKind::Plane),
            ANCHOR_TYPE_GEOSPATIAL => Ok(AnchorKind::Geospatial),
            ANCHOR_TYPE_UNDEFINED => Ok(AnchorKind::Undefined),
            other => Err(format!("unknown anchor type code {}", other)),
        }
    }
}

/// Scene node an anchor is attached to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnchorNode {
    pub name: String,
    pub child_names: Vec<String>,
}

impl AnchorNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            child_names: Vec::new(),
        }
    }

    pub fn with_children(name: &str, children: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            child_names: children.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Geodetic placement of a geospatial anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPose {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// East-Up-South orientation as `[x, y, z, w]`
    pub rotation: [f32; 4],
}

/// Geodetic fields carried only by geospatial records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeospatialFields {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
}

impl From<&GeodeticPose> for GeospatialFields {
    fn from(pose: &GeodeticPose) -> Self {
        let [qx, qy, qz, qw] = pose.rotation;
        Self {
            latitude: pose.latitude,
            longitude: pose.longitude,
            altitude: pose.altitude,
            qx,
            qy,
            qz,
            qw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedHitRecord {
    #[serde(rename = "type")]
    pub kind: HitKind,
    pub distance: f64,
    #[serde(rename = "worldTransform")]
    pub world_transform: FlatTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedAnchorRecord {
    #[serde(rename = "type")]
    pub kind: AnchorKind,
    pub name: String,
    #[serde(rename = "cloudanchorid")]
    pub cloud_anchor_id: Option<String>,
    /// Absent when the record was built without an anchor
    #[serde(rename = "transformation")]
    pub transform: Option<FlatTransform>,
    #[serde(rename = "childNodes")]
    pub child_names: Vec<String>,
    #[serde(flatten)]
    pub geospatial: Option<GeospatialFields>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedLocalTransform {
    pub name: String,
    pub transform: FlatTransform,
}

fn to_wire<T: Serialize>(record: &T) -> ApiResult<Value> {
    serde_json::to_value(record).map_err(|e| ApiError::SerializationError {
        message: e.to_string(),
    })
}

impl SerializedHitRecord {
    /// Mapping-typed wire form
    pub fn to_wire_value(&self) -> ApiResult<Value> {
        to_wire(self)
    }
}

impl SerializedAnchorRecord {
    pub fn to_wire_value(&self) -> ApiResult<Value> {
        to_wire(self)
    }
}

impl SerializedLocalTransform {
    pub fn to_wire_value(&self) -> ApiResult<Value> {
        to_wire(self)
    }
}

/// Classify a hit and attach its flattened pose.
///
/// Plane hits only count as `Plane` when the hit lies inside the plane polygon.
pub fn serialize_hit(hit: &HitResult) -> SerializedHitRecord {
    let kind = match &hit.trackable {
        Trackable::Plane(plane) if plane.is_pose_in_polygon(&hit.hit_pose) => HitKind::Plane,
        Trackable::Point => HitKind::Point,
        _ => HitKind::Undefined,
    };

    SerializedHitRecord {
        kind,
        distance: f64::from(hit.distance),
        world_transform: flatten(&hit.hit_pose),
    }
}

/// Plane-kind anchor record. Child names are copied at call time.
pub fn serialize_anchor(
    node: &AnchorNode,
    anchor: Option<&AnchorHandle>,
    cloud_anchor_id: Option<&str>,
) -> SerializedAnchorRecord {
    SerializedAnchorRecord {
        kind: AnchorKind::Plane,
        name: node.name.clone(),
        cloud_anchor_id: cloud_anchor_id.map(str::to_string),
        transform: anchor.map(|a| flatten(&a.pose)),
        child_names: node.child_names.clone(),
        geospatial: None,
    }
}

/// Geospatial-kind anchor record, always carrying the geodetic fields
pub fn serialize_geospatial_anchor(
    anchor: &AnchorHandle,
    node: &AnchorNode,
    name: &str,
    geodetic: &GeodeticPose,
    cloud_anchor_id: Option<&str>,
) -> SerializedAnchorRecord {
    SerializedAnchorRecord {
        kind: AnchorKind::Geospatial,
        name: name.to_string(),
        cloud_anchor_id: cloud_anchor_id.map(str::to_string),
        transform: Some(flatten(&anchor.pose)),
        child_names: node.child_names.clone(),
        geospatial: Some(GeospatialFields::from(geodetic)),
    }
}

/// Local transform of a scene node, with its scale folded in
pub fn serialize_local_transformation(
    name: &str,
    position: [f32; 3],
    rotation: [f32; 4],
    scale: &Scale,
) -> SerializedLocalTransform {
    SerializedLocalTransform {
        name: name.to_string(),
        transform: flatten_with_scale(&Pose::new(position, rotation), scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::trackable::PlaneTrackable;
    use serde_json::json;

    fn unit_plane() -> PlaneTrackable {
        PlaneTrackable::new(
            Pose::identity(),
            vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
        )
    }

    #[test]
    fn test_hit_on_plane_inside_polygon() {
        let hit = HitResult {
            trackable: Trackable::Plane(unit_plane()),
            hit_pose: Pose::from_translation(0.5, 0.0, 0.5),
            distance: 1.5,
        };
        let record = serialize_hit(&hit);
        assert_eq!(record.kind, HitKind::Plane);
        assert_eq!(record.distance, 1.5);
        assert_eq!(&record.world_transform[12..16], &[0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_hit_on_plane_outside_polygon_is_undefined() {
        let hit = HitResult {
            trackable: Trackable::Plane(unit_plane()),
            hit_pose: Pose::from_translation(3.0, 0.0, 0.0),
            distance: 2.0,
        };
        assert_eq!(serialize_hit(&hit).kind, HitKind::Undefined);
    }

    #[test]
    fn test_hit_kinds() {
        let point = HitResult {
            trackable: Trackable::Point,
            hit_pose: Pose::identity(),
            distance: 0.75,
        };
        assert_eq!(serialize_hit(&point).kind, HitKind::Point);

        let other = HitResult {
            trackable: Trackable::Other,
            hit_pose: Pose::identity(),
            distance: 0.75,
        };
        assert_eq!(serialize_hit(&other).kind, HitKind::Undefined);
    }

    #[test]
    fn test_hit_wire_format() {
        let hit = HitResult {
            trackable: Trackable::Point,
            hit_pose: Pose::identity(),
            distance: 0.5,
        };
        let value = serialize_hit(&hit).to_wire_value().unwrap();
        assert_eq!(value["type"], json!(2));
        assert_eq!(value["distance"], json!(0.5));
        assert_eq!(value["worldTransform"].as_array().map(|a| a.len()), Some(16));
        assert_eq!(value["worldTransform"][15], json!(1.0));
    }

    #[test]
    fn test_plane_anchor_record() {
        let anchor = AnchorHandle::new(1, Pose::from_translation(1.0, 2.0, 3.0));
        let node = AnchorNode::with_children("table", &["cup", "plate"]);

        let record = serialize_anchor(&node, Some(&anchor), Some("cloud-1"));
        assert_eq!(record.kind, AnchorKind::Plane);
        assert_eq!(record.child_names, vec!["cup".to_string(), "plate".to_string()]);

        let value = record.to_wire_value().unwrap();
        assert_eq!(value["type"], json!(0));
        assert_eq!(value["name"], json!("table"));
        assert_eq!(value["cloudanchorid"], json!("cloud-1"));
        assert_eq!(value["transformation"][12], json!(1.0));
        assert_eq!(value["childNodes"], json!(["cup", "plate"]));
        assert!(value.get("latitude").is_none());
        assert!(value.get("qw").is_none());
    }

    #[test]
    fn test_anchor_record_without_anchor() {
        let node = AnchorNode::new("ghost");
        let record = serialize_anchor(&node, None, None);
        assert!(record.transform.is_none());

        let value = record.to_wire_value().unwrap();
        assert_eq!(value["transformation"], Value::Null);
        assert_eq!(value["cloudanchorid"], Value::Null);
        assert_eq!(value["childNodes"], json!([]));
    }

    #[test]
    fn test_child_names_are_a_snapshot() {
        let mut node = AnchorNode::with_children("table", &["cup"]);
        let record = serialize_anchor(&node, None, None);
        node.child_names.push("plate".to_string());
        assert_eq!(record.child_names, vec!["cup".to_string()]);
    }

    #[test]
    fn test_geospatial_anchor_record() {
        let anchor = AnchorHandle::new(2, Pose::identity());
        let node = AnchorNode::with_children("marker", &["sign"]);
        let geodetic = GeodeticPose {
            latitude: 48.8584,
            longitude: 2.2945,
            altitude: 35.0,
            rotation: [0.0, 0.0, 0.0, 1.0],
        };

        let record = serialize_geospatial_anchor(&anchor, &node, "marker", &geodetic, None);
        assert_eq!(record.kind, AnchorKind::Geospatial);

        let value = record.to_wire_value().unwrap();
        assert_eq!(value["type"], json!(1));
        assert_eq!(value["latitude"], json!(48.8584));
        assert_eq!(value["longitude"], json!(2.2945));
        assert_eq!(value["altitude"], json!(35.0));
        assert_eq!(value["qw"], json!(1.0));
        assert_eq!(value["qx"], json!(0.0));
        assert_eq!(value["childNodes"], json!(["sign"]));
        assert_eq!(value["transformation"][0], json!(1.0));
    }

    #[test]
    fn test_local_transformation() {
        let record = serialize_local_transformation(
            "lamp",
            [1.0, 2.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
            &Scale::new(2.0, 2.0, 2.0),
        );
        assert_eq!(record.name, "lamp");
        assert_eq!(record.transform[0], 2.0);
        assert_eq!(record.transform[10], 2.0);
        assert_eq!(&record.transform[12..16], &[1.0, 2.0, 3.0, 1.0]);

        let value = record.to_wire_value().unwrap();
        assert_eq!(value["name"], json!("lamp"));
        assert_eq!(value["transform"][5], json!(2.0));
    }

    #[test]
    fn test_type_codes_are_stable() {
        assert_eq!(u8::from(HitKind::Undefined), 0);
        assert_eq!(u8::from(HitKind::Plane), 1);
        assert_eq!(u8::from(HitKind::Point), 2);
        assert_eq!(u8::from(AnchorKind::Plane), 0);
        assert_eq!(u8::from(AnchorKind::Geospatial), 1);
        assert_eq!(HitKind::try_from(2), Ok(HitKind::Point));
        assert!(AnchorKind::try_from(9).is_err());
    }

    #[test]
    fn test_anchor_record_parses_back() {
        let anchor = AnchorHandle::new(2, Pose::identity());
        let geodetic = GeodeticPose {
            latitude: 1.0,
            longitude: 2.0,
            altitude: 3.0,
            rotation: [0.0, 0.0, 0.0, 1.0],
        };
        let record = serialize_geospatial_anchor(&anchor, &AnchorNode::new("m"), "m", &geodetic, Some("c"));

        let json = serde_json::to_string(&record).unwrap();
        let parsed: SerializedAnchorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
