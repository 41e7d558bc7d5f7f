//! Core data types for anchor poses and cloud anchor states

use nalgebra::{Isometry3, Matrix3, Quaternion, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rigid 3D transform: position plus orientation quaternion.
///
/// The quaternion is stored as `[x, y, z, w]` and is expected to be unit
/// length. Nothing here normalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

impl Pose {
    pub fn new(translation: [f32; 3], rotation: [f32; 4]) -> Self {
        Self { translation, rotation }
    }

    pub fn identity() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Pure translation with identity orientation
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn qx(&self) -> f32 {
        self.rotation[0]
    }

    pub fn qy(&self) -> f32 {
        self.rotation[1]
    }

    pub fn qz(&self) -> f32 {
        self.rotation[2]
    }

    pub fn qw(&self) -> f32 {
        self.rotation[3]
    }

    /// Orientation as a nalgebra unit quaternion (unchecked, see type docs)
    pub fn unit_quaternion(&self) -> UnitQuaternion<f32> {
        let [x, y, z, w] = self.rotation;
        UnitQuaternion::new_unchecked(Quaternion::new(w, x, y, z))
    }

    pub fn to_isometry(&self) -> Isometry3<f32> {
        let [x, y, z] = self.translation;
        Isometry3::from_parts(Translation3::new(x, y, z), self.unit_quaternion())
    }

    pub fn from_isometry(isometry: &Isometry3<f32>) -> Self {
        let t = isometry.translation.vector;
        let q = isometry.rotation.quaternion();
        Self {
            translation: [t.x, t.y, t.z],
            rotation: [q.i, q.j, q.k, q.w],
        }
    }

    /// Build a pose from a rotation matrix and translation vector
    pub fn from_parts(rotation: &Matrix3<f32>, translation: &Vector3<f32>) -> Self {
        let rotation = Rotation3::from_matrix_unchecked(*rotation);
        let q = UnitQuaternion::from_rotation_matrix(&rotation);
        Self {
            translation: [translation.x, translation.y, translation.z],
            rotation: [q.i, q.j, q.k, q.w],
        }
    }

    /// Express a world-space point in this pose's local frame
    pub fn inverse_transform_point(&self, point: &[f32; 3]) -> [f32; 3] {
        let local = self
            .to_isometry()
            .inverse_transform_point(&nalgebra::Point3::new(point[0], point[1], point[2]));
        [local.x, local.y, local.z]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Per-axis scale multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Scale {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn uniform(factor: f32) -> Self {
        Self::new(factor, factor, factor)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Opaque reference to an anchor owned by the AR session.
///
/// The coordinator only borrows handles for the lifetime of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorHandle {
    pub id: u64,
    pub pose: Pose,
}

impl AnchorHandle {
    pub fn new(id: u64, pose: Pose) -> Self {
        Self { id, pose }
    }
}

/// Terminal and in-progress states reported by the hosting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudAnchorState {
    Success,
    ErrorInternal,
    ErrorNotAuthorized,
    ErrorResourceExhausted,
    ErrorHostingServiceUnavailable,
    ErrorDatasetProcessingFailed,
    ErrorCloudIdNotFound,
    ErrorResolvingLocalizationNoMatch,
    ErrorResolvingSdkVersionTooOld,
    ErrorResolvingSdkVersionTooNew,
    TaskInProgress,
}

impl CloudAnchorState {
    pub fn is_success(&self) -> bool {
        matches!(self, CloudAnchorState::Success)
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, CloudAnchorState::Success | CloudAnchorState::TaskInProgress)
    }

    /// Whether no further callback is expected after this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CloudAnchorState::TaskInProgress)
    }
}

impl fmt::Display for CloudAnchorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloudAnchorState::Success => "SUCCESS",
            CloudAnchorState::ErrorInternal => "ERROR_INTERNAL",
            CloudAnchorState::ErrorNotAuthorized => "ERROR_NOT_AUTHORIZED",
            CloudAnchorState::ErrorResourceExhausted => "ERROR_RESOURCE_EXHAUSTED",
            CloudAnchorState::ErrorHostingServiceUnavailable => "ERROR_HOSTING_SERVICE_UNAVAILABLE",
            CloudAnchorState::ErrorDatasetProcessingFailed => "ERROR_HOSTING_DATASET_PROCESSING_FAILED",
            CloudAnchorState::ErrorCloudIdNotFound => "ERROR_CLOUD_ID_NOT_FOUND",
            CloudAnchorState::ErrorResolvingLocalizationNoMatch => "ERROR_RESOLVING_LOCALIZATION_NO_MATCH",
            CloudAnchorState::ErrorResolvingSdkVersionTooOld => "ERROR_RESOLVING_SDK_VERSION_TOO_OLD",
            CloudAnchorState::ErrorResolvingSdkVersionTooNew => "ERROR_RESOLVING_SDK_VERSION_TOO_NEW",
            CloudAnchorState::TaskInProgress => "TASK_IN_PROGRESS",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_pose() {
        let pose = Pose::identity();
        assert_eq!(pose.translation, [0.0, 0.0, 0.0]);
        assert_eq!(pose.qw(), 1.0);
        assert_eq!(Pose::default(), pose);
    }

    #[test]
    fn test_isometry_conversion() {
        let pose = Pose::new([1.0, -2.0, 3.5], [0.0, 0.70710677, 0.0, 0.70710677]);
        let back = Pose::from_isometry(&pose.to_isometry());
        assert_eq!(back.translation, pose.translation);
        for i in 0..4 {
            assert!((back.rotation[i] - pose.rotation[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_inverse_transform_point() {
        let pose = Pose::from_translation(1.0, 0.0, 2.0);
        let local = pose.inverse_transform_point(&[1.5, 0.0, 2.5]);
        assert!((local[0] - 0.5).abs() < 1e-6);
        assert!((local[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_state_classification() {
        assert!(CloudAnchorState::Success.is_success());
        assert!(CloudAnchorState::Success.is_terminal());
        assert!(!CloudAnchorState::TaskInProgress.is_terminal());
        assert!(!CloudAnchorState::TaskInProgress.is_error());
        assert!(CloudAnchorState::ErrorCloudIdNotFound.is_error());
        assert_eq!(CloudAnchorState::ErrorInternal.to_string(), "ERROR_INTERNAL");
    }
}
