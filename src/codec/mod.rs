//! Pose and anchor serialization for the host application
//!
//! Every function here is pure. Transforms are emitted as 16 values in
//! column-major order and consumers read them positionally.

pub mod pose;
pub mod trackable;
pub mod records;

pub use pose::{flatten, flatten_with_scale, unflatten, FlatTransform};
pub use trackable::{HitResult, PlaneTrackable, Trackable};
pub use records::{
    serialize_anchor, serialize_geospatial_anchor, serialize_hit, serialize_local_transformation,
    AnchorKind, AnchorNode, GeodeticPose, GeospatialFields, HitKind, SerializedAnchorRecord,
    SerializedHitRecord, SerializedLocalTransform,
};
