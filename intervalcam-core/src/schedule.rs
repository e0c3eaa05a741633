//! Capture Schedule
//!
//! ## Overview
//!
//! The schedule is one absolute deadline plus the capture interval. A
//! capture is due once the wall clock reaches the deadline; after the
//! capture the deadline moves forward by exactly one interval:
//!
//! ```text
//! deadline:  T0        T0+i        T0+2i       T0+3i
//!            |----i----|----i----|----i----|
//! capture:    ^ (late)   ^          ^ (late)
//! ```
//!
//! Advancing from the deadline rather than from the capture time keeps the
//! series on a fixed grid however late each wake-up is.
//!
//! ## Suspend decision
//!
//! Between captures the device either suspends or stays resident and
//! polls. The suspend request is the remaining time minus the wake-early
//! margin (time to boot and reinitialize); if that is not longer than the
//! minimum suspend, polling is cheaper than a reboot.
//!
//! ## Retained deadline
//!
//! Deep suspend loses RAM. The deadline is written into retained memory as
//! a [`PersistedSchedule`] before suspending and restored after a timer
//! wake. A record that fails validation counts as absent.

use crate::constants::storage::RETAINED_LEN;
use crate::constants::time::{MIN_SUSPEND_MS, WAKE_EARLY_MARGIN_MS};
use crate::errors::ScheduleError;
use crate::time::{millis, Duration, Timestamp};

/// Suspend thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Subtracted from every suspend so the device is up before the deadline
    pub wake_early_margin: Duration,
    /// Suspends up to and including this length are not requested
    pub min_suspend: Duration,
    /// When false the device never suspends and polls instead
    pub suspend_enabled: bool,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            wake_early_margin: millis(WAKE_EARLY_MARGIN_MS),
            min_suspend: millis(MIN_SUSPEND_MS),
            suspend_enabled: true,
        }
    }
}

/// Deadline-driven capture clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleClock {
    deadline: Timestamp,
    interval: Duration,
    policy: SchedulePolicy,
}

impl ScheduleClock {
    /// First capture due immediately
    pub fn starting_at(now: Timestamp, interval: Duration) -> Self {
        Self::resume(now, interval)
    }

    /// Continue a schedule from a retained deadline
    pub fn resume(deadline: Timestamp, interval: Duration) -> Self {
        Self { deadline, interval, policy: SchedulePolicy::default() }
    }

    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    /// `now` has reached the deadline
    pub fn due(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }

    /// Move the deadline one interval forward
    pub fn advance(&mut self) {
        self.deadline = self.deadline + self.interval;
    }

    /// Signed microseconds until the deadline; zero or negative when due
    pub fn time_to_deadline(&self, now: Timestamp) -> i64 {
        now.micros_until(self.deadline)
    }

    /// Suspend length worth requesting, if any
    pub fn suspend_duration(&self, now: Timestamp) -> Option<Duration> {
        if !self.policy.suspend_enabled {
            return None;
        }
        let remaining = self.time_to_deadline(now).max(0) as u64;
        let sleep = remaining.saturating_sub(self.policy.wake_early_margin.ticks());
        if sleep <= self.policy.min_suspend.ticks() {
            None
        } else {
            Some(Duration::from_ticks(sleep))
        }
    }

    /// Retained-memory form of the current deadline
    pub fn persist(&self) -> PersistedSchedule {
        PersistedSchedule { deadline: self.deadline }
    }
}

/// Deadline as kept in retained memory
///
/// Layout, little-endian:
///
/// | offset | size | field                       |
/// |--------|------|-----------------------------|
/// | 0      | 4    | magic                       |
/// | 4      | 8    | deadline, seconds           |
/// | 12     | 4    | deadline, microseconds part |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedSchedule {
    pub deadline: Timestamp,
}

impl PersistedSchedule {
    /// Marks a record written by this firmware
    pub const MAGIC: u32 = 0x4C41_5054;

    pub fn to_bytes(&self) -> [u8; RETAINED_LEN] {
        let mut out = [0u8; RETAINED_LEN];
        out[0..4].copy_from_slice(&Self::MAGIC.to_le_bytes());
        out[4..12].copy_from_slice(&self.deadline.as_secs().to_le_bytes());
        out[12..16].copy_from_slice(&self.deadline.subsec_micros().to_le_bytes());
        out
    }

    /// Decode and validate
    pub fn from_bytes(bytes: &[u8; RETAINED_LEN]) -> Result<Self, ScheduleError> {
        let mut magic = [0u8; 4];
        let mut secs = [0u8; 8];
        let mut micros = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        secs.copy_from_slice(&bytes[4..12]);
        micros.copy_from_slice(&bytes[12..16]);

        if u32::from_le_bytes(magic) != Self::MAGIC {
            return Err(ScheduleError::Corrupt { reason: "bad magic" });
        }
        let micros = u32::from_le_bytes(micros);
        if micros >= 1_000_000 {
            return Err(ScheduleError::Corrupt { reason: "microseconds out of range" });
        }
        let record = Self { deadline: Timestamp::from_unix(u64::from_le_bytes(secs), micros) };
        record.validate()?;
        Ok(record)
    }

    /// A deadline before the minimum epoch was never written by a running
    /// schedule
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.deadline.is_plausible() {
            Ok(())
        } else {
            Err(ScheduleError::Corrupt { reason: "deadline before minimum epoch" })
        }
    }
}
