//! Cloud Anchor Bridge
//!
//! Coordinates asynchronous cloud anchor hosting and resolving against an
//! AR session, and serializes anchors, hits and poses into the flat records
//! a host application consumes.

pub mod core;
pub mod session;
pub mod api;
pub mod codec;
pub mod registry;
pub mod utils;

// Re-export commonly used types
pub use core::{AnchorHandle, CloudAnchorState, Pose, Scale};
pub use session::{ArSession, MockSession, SessionError, SessionResult};
pub use api::{
    ApiError, ApiResult, ChannelListener, CloudAnchorCoordinator, CloudAnchorListener,
    CloudAnchorOutcome, CloudTaskResult, RequestId,
};
pub use codec::{
    flatten, flatten_with_scale, serialize_anchor, serialize_geospatial_anchor, serialize_hit,
    serialize_local_transformation, FlatTransform, SerializedAnchorRecord, SerializedHitRecord,
};
pub use registry::{AnchorRegistry, RegistryListener};
pub use utils::{ConfigError, ConfigurationManager, CoordinatorConfig};
