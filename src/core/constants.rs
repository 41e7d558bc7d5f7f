//! Wire-format constants shared with host application consumers

/// Number of elements in a flattened 4x4 homogeneous transform
pub const FLAT_TRANSFORM_LEN: usize = 16;

/// Flattened-transform indices multiplied by the x scale factor
pub const SCALE_X_INDICES: [usize; 3] = [0, 4, 8];

/// Flattened-transform indices multiplied by the y scale factor
pub const SCALE_Y_INDICES: [usize; 3] = [1, 5, 9];

/// Flattened-transform indices multiplied by the z scale factor.
///
/// Older consumers were fed `[2, 7, 10]`. Index 7 is the zero in the
/// homogeneous row of the Y basis column, so that set left element 6 unscaled.
pub const SCALE_Z_INDICES: [usize; 3] = [2, 6, 10];

/// Hit record type codes
pub const HIT_TYPE_UNDEFINED: u8 = 0;
pub const HIT_TYPE_PLANE: u8 = 1;
pub const HIT_TYPE_POINT: u8 = 2;

/// Anchor record type codes
pub const ANCHOR_TYPE_PLANE: u8 = 0;
pub const ANCHOR_TYPE_GEOSPATIAL: u8 = 1;
pub const ANCHOR_TYPE_UNDEFINED: u8 = 2;

/// Hosting service TTL limits (days)
pub const MIN_TTL_DAYS: u32 = 1;
pub const MAX_TTL_DAYS: u32 = 365;
