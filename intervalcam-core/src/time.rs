//! Time handling for a device without a battery-backed clock
//!
//! Two kinds of time value cross the core:
//! - [`Timestamp`]: absolute wall-clock time, microseconds since the Unix
//!   epoch. This is what the board reports and what the retained schedule
//!   stores (as seconds plus microseconds).
//! - [`Duration`]: unsigned microsecond durations (`fugit`), used for the
//!   capture interval, suspend requests and margins.
//!
//! Signed differences (time left until a deadline that may already have
//! passed) are plain `i64` microseconds.

use core::ops::Add;

use chrono::{DateTime, NaiveDateTime};

use crate::constants::time::{NOT_BEFORE_TIME, US_PER_MS, US_PER_SECOND};

/// Unsigned duration with microsecond resolution
pub type Duration = fugit::MicrosDurationU64;

/// Build a [`Duration`] from milliseconds
pub const fn millis(ms: u64) -> Duration {
    Duration::from_ticks(ms.saturating_mul(US_PER_MS))
}

/// Absolute wall-clock time in microseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    micros: u64,
}

impl Timestamp {
    /// The Unix epoch
    pub const EPOCH: Self = Self { micros: 0 };

    /// Timestamp from microseconds since the epoch
    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    /// Timestamp from whole seconds since the epoch
    pub const fn from_secs(secs: u64) -> Self {
        Self { micros: secs.saturating_mul(US_PER_SECOND) }
    }

    /// Timestamp from a `timeval`-style pair; excess microseconds carry over
    pub const fn from_unix(secs: u64, micros: u32) -> Self {
        Self {
            micros: secs
                .saturating_mul(US_PER_SECOND)
                .saturating_add(micros as u64),
        }
    }

    /// Microseconds since the epoch
    pub const fn as_micros(&self) -> u64 {
        self.micros
    }

    /// Whole seconds since the epoch
    pub const fn as_secs(&self) -> u64 {
        self.micros / US_PER_SECOND
    }

    /// Microsecond part below the whole second
    pub const fn subsec_micros(&self) -> u32 {
        (self.micros % US_PER_SECOND) as u32
    }

    /// Whether the value can only have come from a clock that was set
    pub const fn is_plausible(&self) -> bool {
        self.as_secs() >= NOT_BEFORE_TIME
    }

    /// `self + duration`, or `None` on overflow
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.micros.checked_add(duration.ticks()).map(Self::from_micros)
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_ticks(self.micros.saturating_sub(earlier.micros))
    }

    /// Signed microseconds from `self` until `later`; negative if `later`
    /// is already behind
    pub fn micros_until(self, later: Self) -> i64 {
        let diff = later.micros as i128 - self.micros as i128;
        diff.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// UTC calendar time, `None` if out of chrono's range
    pub fn to_naive_utc(self) -> Option<NaiveDateTime> {
        let secs = i64::try_from(self.as_secs()).ok()?;
        DateTime::from_timestamp(secs, self.subsec_micros() * 1000).map(|dt| dt.naive_utc())
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    /// Saturates at the end of representable time
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp::from_micros(self.micros.saturating_add(rhs.ticks()))
    }
}
