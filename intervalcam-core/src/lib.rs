//! Core logic for a deep-sleeping interval camera
//!
//! Takes one picture every configured interval, stores it on a removable
//! card, and spends the time in between in timed deep suspend.
//!
//! Key constraints:
//! - Only a few bytes of retained memory survive a suspend
//! - The wall clock may be unset after a power loss
//! - No heap allocation for paths or names
//!
//! ```no_run
//! use intervalcam_core::{ConfigStore, ScheduleClock, Timestamp};
//!
//! let mut config = ConfigStore::new();
//! config.load_str("interval = 30000\nframesize = VGA\n").unwrap();
//!
//! let now = Timestamp::from_secs(1_700_000_000);
//! let mut clock = ScheduleClock::starting_at(now, config.settings().capture_interval());
//! if clock.due(now) {
//!     // capture, then
//!     clock.advance();
//! }
//! let _sleep = clock.suspend_duration(now);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod config;
pub mod constants;
pub mod errors;
pub mod orchestrator;
pub mod platform;
pub mod schedule;
pub mod session;
pub mod time;

// Public API
pub use config::{ConfigStore, Settings};
pub use errors::{
    CaptureError, ConfigError, ConfigResult, Fault, LoadError, ScheduleError, StorageError,
    StorageResult,
};
pub use orchestrator::{CaptureStats, Orchestrator, ProvisioningReason, SkipReason, State};
pub use platform::{Board, Camera, FileSink, Storage, WakeCause};
pub use schedule::{PersistedSchedule, ScheduleClock, SchedulePolicy};
pub use session::{SessionDirectoryManager, SessionPath};
pub use time::{Duration, Timestamp};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
