//! Sensor Tuning Limits
//!
//! Accepted ranges for the integer sensor settings. Bounds are inclusive and
//! follow the OV2640/OV3660 driver's register ranges.

/// JPEG quality, lower is better quality (10 = best the driver allows).
pub const QUALITY_MIN: i64 = 10;
/// JPEG quality upper bound.
pub const QUALITY_MAX: i64 = 63;

/// Contrast, brightness, saturation and AE level share a symmetric range.
pub const LEVEL_MIN: i64 = -2;
/// Upper bound of the symmetric level range.
pub const LEVEL_MAX: i64 = 2;

/// Manual gain on the external 1-based scale.
///
/// Stored zero-based (0..=31) as the sensor register expects.
pub const AGC_GAIN_MIN: i64 = 1;
/// Upper bound of the external manual gain scale.
pub const AGC_GAIN_MAX: i64 = 32;

/// Gain ceiling index (2x .. 128x).
pub const GAIN_CEILING_MIN: i64 = 0;
/// Upper bound of the gain ceiling index.
pub const GAIN_CEILING_MAX: i64 = 6;

/// Manual exposure value.
pub const AEC_VALUE_MIN: i64 = 0;
/// Upper bound of the manual exposure value.
pub const AEC_VALUE_MAX: i64 = 1200;

/// Capacity of the timezone descriptor in bytes.
pub const TIMEZONE_MAX_LEN: usize = 63;
