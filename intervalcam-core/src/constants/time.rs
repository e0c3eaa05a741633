//! Time-Related Constants
//!
//! Unit conversions, the capture interval floor, and the margins that decide
//! whether a deep suspend is worth its own cost.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1000;

/// Microseconds per second.
pub const US_PER_SECOND: u64 = 1_000_000;

// ===== CAPTURE INTERVAL =====

/// Smallest capture interval the device will honour (milliseconds).
///
/// Capture files are named by local date and time with one-second
/// resolution, so two captures inside the same second would collide.
/// Configured values below this are clamped up, not rejected.
pub const MIN_CAPTURE_INTERVAL_MS: u32 = 1000;

/// Capture interval used when the settings file does not set one (milliseconds).
pub const DEFAULT_CAPTURE_INTERVAL_MS: u32 = 60_000;

// ===== SUSPEND POLICY =====

/// Time budget to bring the board, storage and sensor back up after a
/// timed wake (milliseconds).
///
/// Subtracted from every suspend request so the device is initialized and
/// polling before the deadline arrives.
///
/// Source: ESP32 deep-sleep wake plus SD mount and OV2640 init, measured
pub const WAKE_EARLY_MARGIN_MS: u64 = 1500;

/// Shortest suspend worth requesting (milliseconds).
///
/// A suspend/resume cycle costs a full reboot. Below this floor the device
/// stays resident and polls instead. A suspend of exactly this length is
/// still considered too short.
pub const MIN_SUSPEND_MS: u64 = 5000;

/// Delay between polls while resident and waiting for a deadline (milliseconds).
pub const IDLE_POLL_MS: u64 = 10;

// ===== CLOCK PLAUSIBILITY =====

/// Minimal Unix time (seconds) for the wall clock to be considered set.
///
/// A clock below this has never been synchronised, and a retained deadline
/// below this was never written by a running schedule.
pub const NOT_BEFORE_TIME: u64 = 1_568_184_212;
