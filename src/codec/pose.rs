//! Pose flattening into the 16-element homogeneous transform

use crate::api::types::{ApiError, ApiResult};
use crate::core::{Pose, Scale, FLAT_TRANSFORM_LEN, SCALE_X_INDICES, SCALE_Y_INDICES, SCALE_Z_INDICES};
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Column-major 4x4 homogeneous transform.
///
/// Elements 0-3 hold the X basis column, 4-7 the Y basis, 8-11 the Z basis
/// and 12-15 the translation followed by 1.
pub type FlatTransform = [f64; FLAT_TRANSFORM_LEN];

/// Flatten a pose into its column-major homogeneous transform
pub fn flatten(pose: &Pose) -> FlatTransform {
    let matrix: Matrix4<f32> = pose.to_isometry().to_homogeneous();
    let mut flat = [0.0; FLAT_TRANSFORM_LEN];
    // nalgebra storage is column-major already
    for (dst, src) in flat.iter_mut().zip(matrix.as_slice()) {
        *dst = f64::from(*src);
    }
    flat
}

/// Flatten a pose and fold a per-axis scale into the basis elements.
/// The translation column is never scaled.
pub fn flatten_with_scale(pose: &Pose, scale: &Scale) -> FlatTransform {
    let mut flat = flatten(pose);
    for index in SCALE_X_INDICES {
        flat[index] *= f64::from(scale.x);
    }
    for index in SCALE_Y_INDICES {
        flat[index] *= f64::from(scale.y);
    }
    for index in SCALE_Z_INDICES {
        flat[index] *= f64::from(scale.z);
    }
    flat
}

/// Rebuild a pose from an unscaled flattened transform
pub fn unflatten(flat: &FlatTransform) -> ApiResult<Pose> {
    if let Some(index) = flat.iter().position(|v| !v.is_finite()) {
        return Err(ApiError::InvalidTransform {
            reason: format!("element {} is not finite", index),
        });
    }

    let homogeneous_row = [flat[3], flat[7], flat[11], flat[15]];
    if homogeneous_row != [0.0, 0.0, 0.0, 1.0] {
        return Err(ApiError::InvalidTransform {
            reason: format!("bottom row {:?} is not [0, 0, 0, 1]", homogeneous_row),
        });
    }

    let values: Vec<f32> = flat.iter().map(|v| *v as f32).collect();
    let matrix = Matrix4::from_column_slice(&values);
    let rotation: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let translation = Vector3::new(values[12], values[13], values[14]);

    Ok(Pose::from_parts(&rotation, &translation))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: FlatTransform = [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];

    fn assert_close(actual: &FlatTransform, expected: &FlatTransform, tolerance: f64) {
        for i in 0..FLAT_TRANSFORM_LEN {
            assert!(
                (actual[i] - expected[i]).abs() < tolerance,
                "element {}: {} vs {}",
                i,
                actual[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_identity_flatten() {
        assert_eq!(flatten(&Pose::identity()), IDENTITY);
    }

    #[test]
    fn test_translation_column() {
        let flat = flatten(&Pose::from_translation(1.5, -2.0, 3.25));
        assert_eq!(&flat[12..16], &[1.5, -2.0, 3.25, 1.0]);
        assert_eq!(&flat[0..12], &IDENTITY[0..12]);
    }

    #[test]
    fn test_rotation_about_y() {
        // 90 degrees about +Y maps X to -Z and Z to +X
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let flat = flatten(&Pose::new([0.0, 0.0, 0.0], [0.0, half, 0.0, half]));

        let expected: FlatTransform = [
            0.0, 0.0, -1.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        assert_close(&flat, &expected, 1e-6);
    }

    #[test]
    fn test_flatten_with_scale_identity() {
        let flat = flatten_with_scale(&Pose::identity(), &Scale::new(2.0, 3.0, 4.0));

        let expected: FlatTransform = [
            2.0, 0.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, 0.0, //
            0.0, 0.0, 4.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_flatten_with_scale_touches_only_scale_indices() {
        let pose = Pose::new([4.0, 5.0, 6.0], [0.18257418, 0.36514837, 0.5477226, 0.73029673]);
        let plain = flatten(&pose);
        let scaled = flatten_with_scale(&pose, &Scale::new(2.0, 3.0, 4.0));

        for i in 0..FLAT_TRANSFORM_LEN {
            let factor = if SCALE_X_INDICES.contains(&i) {
                2.0
            } else if SCALE_Y_INDICES.contains(&i) {
                3.0
            } else if SCALE_Z_INDICES.contains(&i) {
                4.0
            } else {
                1.0
            };
            assert_eq!(scaled[i], plain[i] * factor, "element {}", i);
        }
        // translation column untouched
        assert_eq!(&scaled[12..16], &[4.0, 5.0, 6.0, 1.0]);
    }

    #[test]
    fn test_round_trip() {
        let pose = Pose::new([0.25, -1.75, 3.5], [0.18257418, 0.36514837, 0.5477226, 0.73029673]);
        let flat = flatten(&pose);
        let rebuilt = unflatten(&flat).unwrap();

        assert_eq!(rebuilt.translation, pose.translation);

        // q and -q describe the same rotation
        let dot: f32 = (0..4).map(|i| rebuilt.rotation[i] * pose.rotation[i]).sum();
        let sign = dot.signum();
        for i in 0..4 {
            assert!((rebuilt.rotation[i] * sign - pose.rotation[i]).abs() < 1e-5);
        }
        assert_close(&flatten(&rebuilt), &flat, 1e-5);
    }

    #[test]
    fn test_unflatten_rejects_invalid() {
        let mut flat = IDENTITY;
        flat[5] = f64::NAN;
        assert!(matches!(unflatten(&flat), Err(ApiError::InvalidTransform { .. })));

        let mut flat = IDENTITY;
        flat[7] = 0.5;
        assert!(matches!(unflatten(&flat), Err(ApiError::InvalidTransform { .. })));
    }
}
