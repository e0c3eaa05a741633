//! Constants for intervalcam
//!
//! Every compiled-in number lives here, grouped by domain:
//! - **Time**: unit conversions, interval floor, suspend margins, epoch floor
//! - **Storage**: card layout, naming, buffer capacities
//! - **Camera**: accepted ranges of the sensor tuning settings
//!
//! Runtime-tunable values live in [`crate::config::Settings`]; the constants
//! here are the bounds and defaults those settings are checked against.

/// Time-related constants for intervals, margins and clock validity.
pub mod time;

/// Card layout and naming.
pub mod storage;

/// Sensor setting ranges.
pub mod camera;

pub use time::{
    MS_PER_SECOND, US_PER_SECOND, MIN_CAPTURE_INTERVAL_MS, DEFAULT_CAPTURE_INTERVAL_MS,
    WAKE_EARLY_MARGIN_MS, MIN_SUSPEND_MS, NOT_BEFORE_TIME,
};

pub use storage::{
    STORAGE_ROOT, CONFIG_PATH, SESSION_PREFIX, SESSION_DIGITS, MAX_PATH_LEN, RETAINED_LEN,
};
