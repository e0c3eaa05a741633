//! Hardware collaborators
//!
//! The core never touches a peripheral directly. Everything the capture
//! cycle needs from the outside world is one of three traits:
//!
//! - [`Storage`]: the mounted card (directory listing, directory creation,
//!   file writes, reading the settings file)
//! - [`Camera`]: the image sensor
//! - [`Board`]: everything else (wall clock, wake cause, retained memory,
//!   timed suspend, indicator LEDs)
//!
//! Board support packages implement these for real hardware; the host
//! crate implements them on top of `std::fs` and the system clock.

use alloc::string::String;
use alloc::vec::Vec;

use chrono::NaiveDateTime;

use crate::config::Settings;
use crate::constants::storage::RETAINED_LEN;
use crate::errors::{CaptureError, Fault, StorageResult};
use crate::time::{Duration, Timestamp};

/// An open file being written
pub trait FileSink {
    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Flush and close; the data is durable once this returns `Ok`
    fn close(self) -> StorageResult<()>;
}

/// Mounted filesystem
///
/// Paths are absolute and `/`-separated, rooted at the mount point
/// (`/sdcard/...`).
pub trait Storage {
    /// File handle returned by [`Storage::open_write`]
    type File: FileSink;

    /// Call `visit` with the name (not the path) of every entry in `path`
    fn list_dir(&mut self, path: &str, visit: &mut dyn FnMut(&str)) -> StorageResult<()>;

    /// Create a single directory; the parent must exist
    fn create_dir(&mut self, path: &str) -> StorageResult<()>;

    /// Create or truncate a file for writing
    fn open_write(&mut self, path: &str) -> StorageResult<Self::File>;

    /// Whole file as UTF-8 text, `Ok(None)` if it does not exist
    fn read_to_string(&mut self, path: &str) -> StorageResult<Option<String>>;
}

/// Image sensor
pub trait Camera {
    /// Encoded frame; released when dropped
    type Frame: AsRef<[u8]>;

    /// Power up and program the sensor from `settings`
    fn init(&mut self, settings: &Settings) -> Result<(), CaptureError>;

    /// Grab one encoded frame
    fn capture_frame(&mut self) -> Result<Self::Frame, CaptureError>;

    /// Bytes written to the file ahead of the frame (EXIF block with
    /// orientation and capture time). Empty by default.
    fn frame_header_bytes(&mut self, _frame: &Self::Frame, _settings: &Settings) -> Vec<u8> {
        Vec::new()
    }
}

/// What started the current activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeCause {
    /// Power applied
    PowerOn,
    /// The timed suspend requested by the previous activation expired
    Timer,
    /// Reset button or watchdog
    Reset,
    /// Any other wake source
    Other,
}

impl WakeCause {
    /// Only a timer wake continues the previous session
    pub const fn is_timer(self) -> bool {
        matches!(self, WakeCause::Timer)
    }
}

/// Everything on the board that is not storage or sensor
pub trait Board {
    /// Filesystem returned by [`Board::mount_storage`]
    type Storage: Storage;

    /// Mount the card
    fn mount_storage(&mut self) -> StorageResult<Self::Storage>;

    /// Wall clock; may be unset (near the epoch) after a power loss
    fn current_time(&mut self) -> Timestamp;

    /// Apply a POSIX TZ descriptor for [`Board::local_time`]
    fn set_timezone(&mut self, tz: &str);

    /// Local calendar time for naming capture files
    fn local_time(&mut self, at: Timestamp) -> Option<NaiveDateTime> {
        at.to_naive_utc()
    }

    /// Why this activation started
    fn wake_cause(&mut self) -> WakeCause;

    /// Provisioning trigger (button held at boot, or similar)
    fn provisioning_requested(&mut self) -> bool {
        false
    }

    /// Memory that survives a timed suspend
    fn read_retained(&mut self) -> [u8; RETAINED_LEN];

    fn write_retained(&mut self, data: &[u8; RETAINED_LEN]);

    /// Enter timed suspend. On hardware this does not return; the next
    /// activation starts from cold init with `WakeCause::Timer`.
    fn request_timed_suspend(&mut self, duration: Duration);

    fn set_busy_indicator(&mut self, _on: bool) {}

    fn set_flash(&mut self, _on: bool) {}

    /// Show the fault (blink code, status LED)
    fn signal_fault(&mut self, fault: Fault);

    /// Called between polls while resident
    fn idle(&mut self) {}
}
