//! Error Types for Settings, Storage, Schedule and Capture Failures
//!
//! ## Design Philosophy
//!
//! The same rules as any code that runs between two deep-suspend cycles:
//!
//! 1. **Small Size**: every variant carries at most a few integers or a
//!    `&'static str`, so errors can be returned from hot paths and stored in
//!    the orchestrator's terminal state without allocation.
//!
//! 2. **Copy Semantics**: all errors are `Copy`. A `Fault` is kept inside
//!    `State::Halted` and handed out by value.
//!
//! 3. **Actionable Information**: each error tells the caller which policy
//!    applies (skip one key, refuse the file, halt the device, reset the
//!    schedule) without further queries.
//!
//! ## Error Categories
//!
//! ### Per-key settings rejections (`ConfigError`)
//! Never fatal. The field keeps its previous value, the line is logged and
//! the load continues.
//!
//! ### Whole-file rejection (`LoadError`)
//! Fatal outside provisioning mode, tolerated inside it.
//!
//! ### Storage (`StorageError`)
//! Fatal during cold init. A failed frame write only skips that frame.
//!
//! ### Retained schedule (`ScheduleError`)
//! Treated as "no retained state": the deadline restarts at the current time.
//!
//! ### Sensor (`CaptureError`)
//! Init failure halts; a single failed capture is skipped.
//!
//! ```rust
//! use intervalcam_core::{ConfigError, ConfigStore};
//!
//! let mut store = ConfigStore::new();
//! match store.apply("quality", "99") {
//!     Err(ConfigError::OutOfRange { min, max, .. }) => assert_eq!((min, max), (10, 63)),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for single-key settings updates
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for storage collaborator calls
pub type StorageResult<T> = Result<T, StorageError>;

/// A single `key = value` pair was rejected; the field is unchanged
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not a base-10 integer
    #[error("Value of '{key}' is not a valid integer")]
    NotAnInteger {
        /// Canonical key name
        key: &'static str,
    },

    /// Integer parsed but lies outside the declared inclusive range
    #[error("Value {value} of '{key}' outside range [{min}, {max}]")]
    OutOfRange {
        /// Canonical key name
        key: &'static str,
        /// The rejected value
        value: i64,
        /// Smallest accepted value
        min: i64,
        /// Largest accepted value
        max: i64,
    },

    /// Integer in range but not one of the values the key can represent
    #[error("Value {value} of '{key}' is not supported")]
    Unsupported {
        /// Canonical key name
        key: &'static str,
        /// The rejected value
        value: i64,
    },

    /// Not one of the accepted boolean spellings
    #[error("Value of '{key}' is not a valid boolean")]
    NotABoolean {
        /// Canonical key name
        key: &'static str,
    },

    /// No alias in the enumeration table matched
    #[error("Invalid value for '{key}'")]
    UnknownChoice {
        /// Canonical key name
        key: &'static str,
    },

    /// Text longer than the field can hold
    #[error("Value of '{key}' too long ({len} > {max} bytes)")]
    TooLong {
        /// Canonical key name
        key: &'static str,
        /// Length of the rejected value in bytes
        len: usize,
        /// Field capacity in bytes
        max: usize,
    },

    /// Text with control characters or surrounding whitespace, which the
    /// settings file cannot hold
    #[error("Value of '{key}' has control characters or surrounding whitespace")]
    InvalidText {
        /// Canonical key name
        key: &'static str,
    },
}

impl ConfigError {
    /// Key the rejection refers to
    pub const fn key(&self) -> &'static str {
        match self {
            Self::NotAnInteger { key }
            | Self::OutOfRange { key, .. }
            | Self::Unsupported { key, .. }
            | Self::NotABoolean { key }
            | Self::UnknownChoice { key }
            | Self::TooLong { key, .. }
            | Self::InvalidText { key } => key,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotAnInteger { key } =>
                defmt::write!(fmt, "'{}' not an integer", key),
            Self::OutOfRange { key, value, min, max } =>
                defmt::write!(fmt, "'{}' = {} outside [{}, {}]", key, value, min, max),
            Self::Unsupported { key, value } =>
                defmt::write!(fmt, "'{}' = {} unsupported", key, value),
            Self::NotABoolean { key } =>
                defmt::write!(fmt, "'{}' not a boolean", key),
            Self::UnknownChoice { key } =>
                defmt::write!(fmt, "'{}' invalid choice", key),
            Self::TooLong { key, len, max } =>
                defmt::write!(fmt, "'{}' too long ({} > {})", key, len, max),
            Self::InvalidText { key } =>
                defmt::write!(fmt, "'{}' not storable text", key),
        }
    }
}

/// Errors reported by (or on behalf of) the storage collaborator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Card missing or filesystem unmountable
    #[error("Storage mount failed")]
    MountFailed,
    /// Directory could not be enumerated
    #[error("Failed to list directory")]
    ListFailed,
    /// Directory could not be created
    #[error("Failed to create directory")]
    CreateDirFailed,
    /// File could not be opened
    #[error("Failed to open file")]
    OpenFailed,
    /// Write to an open file failed
    #[error("Failed to write to file")]
    WriteFailed,
    /// Flush/close of a file failed
    #[error("Failed to close file")]
    CloseFailed,
    /// Existing file could not be read
    #[error("Failed to read file")]
    ReadFailed,
    /// A generated path does not fit the fixed path buffer
    #[error("Path too long")]
    PathTooLong,
    /// Every session number up to 9999 is in use
    #[error("No free session number left")]
    SessionsExhausted,
}

/// The settings file exists but cannot be used as a whole
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// At least one line was malformed or one value rejected
    #[error("Settings rejected: {rejected} invalid value(s), {malformed} malformed line(s)")]
    Invalid {
        /// Number of `key = value` pairs whose value failed validation
        rejected: usize,
        /// Number of lines that were not `key = value`
        malformed: usize,
    },

    /// Reading the file failed
    #[error("Settings unreadable: {0}")]
    Storage(#[from] StorageError),
}

/// Retained schedule state is not usable
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// Magic, field range or epoch check failed
    #[error("Retained schedule corrupt: {reason}")]
    Corrupt {
        /// Which check failed
        reason: &'static str,
    },
}

/// Errors reported by the image sensor collaborator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// Sensor did not come up with the requested settings
    #[error("Sensor init failed")]
    SensorInit,
    /// No frame buffer was returned
    #[error("Frame capture failed")]
    CaptureFailed,
}

/// Why the orchestrator entered the terminal `Halted` state
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Mount, listing or session directory creation failed
    #[error("Storage fault: {0}")]
    Storage(StorageError),
    /// Settings file present but unusable, outside provisioning mode
    #[error("Settings fault: {0}")]
    Config(LoadError),
    /// Sensor init failed
    #[error("Sensor fault: {0}")]
    Sensor(CaptureError),
    /// The provisioning layer failed to start
    #[error("Provisioning mode failed to start")]
    Provisioning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_its_key() {
        let err = ConfigError::OutOfRange { key: "quality", value: 64, min: 10, max: 63 };
        assert_eq!(err.key(), "quality");
        assert_eq!(ConfigError::NotABoolean { key: "awb" }.key(), "awb");
    }

    #[test]
    fn load_error_wraps_storage() {
        let err: LoadError = StorageError::ReadFailed.into();
        assert_eq!(err, LoadError::Storage(StorageError::ReadFailed));
    }

    #[cfg(feature = "std")]
    #[test]
    fn messages_are_readable() {
        use std::string::ToString;

        let err = ConfigError::TooLong { key: "timezone", len: 80, max: 63 };
        assert_eq!(err.to_string(), "Value of 'timezone' too long (80 > 63 bytes)");

        let fault = Fault::Storage(StorageError::MountFailed);
        assert_eq!(fault.to_string(), "Storage fault: Storage mount failed");
    }
}
