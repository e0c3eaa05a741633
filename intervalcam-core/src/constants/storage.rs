//! Storage Layout Constants
//!
//! Where things live on the removable card and how they are named.

/// Mount point of the removable card.
pub const STORAGE_ROOT: &str = "/sdcard";

/// Settings file, read once per activation.
pub const CONFIG_PATH: &str = "/sdcard/timelapse.conf";

/// Name prefix of session directories (`timelapse0001`, ...).
pub const SESSION_PREFIX: &str = "timelapse";

/// Number of zero-padded decimal digits after the session prefix.
pub const SESSION_DIGITS: usize = 4;

/// Highest session number representable in `SESSION_DIGITS` digits.
pub const MAX_SESSION_NUMBER: u16 = 9999;

/// Extension of captured image files.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Capacity of every path buffer in bytes.
///
/// Longest path produced: `/sdcard/timelapse0001/20240101_120000.jpg`
/// (41 bytes).
pub const MAX_PATH_LEN: usize = 64;

/// Size of the retained memory block holding the schedule (bytes).
pub const RETAINED_LEN: usize = 16;
