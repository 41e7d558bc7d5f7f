//! Hit-test results and the trackables they land on

use crate::core::Pose;

/// Detected plane with its boundary polygon.
///
/// `polygon` vertices are (x, z) in the plane's local frame, where the
/// plane's normal is local +Y.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneTrackable {
    pub center_pose: Pose,
    pub polygon: Vec<[f32; 2]>,
}

impl PlaneTrackable {
    pub fn new(center_pose: Pose, polygon: Vec<[f32; 2]>) -> Self {
        Self { center_pose, polygon }
    }

    /// Whether `pose`, projected onto the plane, lies inside the boundary polygon
    pub fn is_pose_in_polygon(&self, pose: &Pose) -> bool {
        if self.polygon.len() < 3 {
            return false;
        }

        let local = self.center_pose.inverse_transform_point(&pose.translation);
        let (px, pz) = (local[0], local[2]);

        // Even-odd ray cast along +x
        let mut inside = false;
        let mut j = self.polygon.len() - 1;
        for i in 0..self.polygon.len() {
            let [xi, zi] = self.polygon[i];
            let [xj, zj] = self.polygon[j];
            if (zi > pz) != (zj > pz) {
                let crossing_x = xi + (pz - zi) * (xj - xi) / (zj - zi);
                if px < crossing_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// What a hit test struck
#[derive(Debug, Clone, PartialEq)]
pub enum Trackable {
    Plane(PlaneTrackable),
    /// Feature point from the point cloud
    Point,
    /// Any other trackable (images, depth points, ...)
    Other,
}

/// Single hit-test result
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub trackable: Trackable,
    pub hit_pose: Pose,
    /// Distance from the camera to the hit (meters)
    pub distance: f32,
}
