//! Host board: system or virtual clock, retained memory in a file
//!
//! Timed suspend cannot stop the host process, so the board only records
//! the request; the simulator ends the activation there and starts the
//! next one with a timer wake once the time has passed.

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDateTime;
use intervalcam_core::constants::storage::RETAINED_LEN;
use intervalcam_core::time::millis;
use intervalcam_core::{Board, Duration, Fault, StorageResult, Timestamp, WakeCause};

use crate::fs::FsStorage;

/// Wall clock of the simulated device
#[derive(Debug, Clone)]
pub enum HostClock {
    /// Host system time; waiting really sleeps
    System,
    /// Shared virtual time; waiting only moves it forward
    Virtual(Rc<Cell<Timestamp>>),
}

impl HostClock {
    /// Virtual clock starting at `start`
    pub fn virtual_at(start: Timestamp) -> Self {
        HostClock::Virtual(Rc::new(Cell::new(start)))
    }

    /// Virtual clock starting at the current system time
    pub fn virtual_from_system() -> Self {
        Self::virtual_at(system_now())
    }

    pub fn now(&self) -> Timestamp {
        match self {
            HostClock::System => system_now(),
            HostClock::Virtual(now) => now.get(),
        }
    }

    /// Let `duration` pass
    pub fn wait(&self, duration: Duration) {
        match self {
            HostClock::System => std::thread::sleep(std::time::Duration::from_micros(duration.ticks())),
            HostClock::Virtual(now) => now.set(now.get() + duration),
        }
    }
}

fn system_now() -> Timestamp {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since) => Timestamp::from_unix(since.as_secs(), since.subsec_micros()),
        Err(_) => Timestamp::EPOCH,
    }
}

/// Seconds east of UTC for the standard time of a POSIX TZ descriptor
///
/// `CET-1CEST,M3.5.0,M10.5.0/3` gives `3600`, `EST5EDT` gives `-18000`.
/// Daylight saving rules are not evaluated.
pub fn posix_tz_offset(tz: &str) -> Option<i64> {
    let rest = match tz.strip_prefix('<') {
        Some(quoted) => &quoted[quoted.find('>')? + 1..],
        None => {
            let name_len = tz.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(tz.len());
            if name_len < 3 {
                return None;
            }
            &tz[name_len..]
        }
    };

    let (sign, rest) = match rest.as_bytes().first() {
        Some(b'-') => (-1, &rest[1..]),
        Some(b'+') => (1, &rest[1..]),
        _ => (1, rest),
    };
    let end = rest.find(|c: char| !(c.is_ascii_digit() || c == ':')).unwrap_or(rest.len());
    let mut fields = rest[..end].split(':');

    let hours: i64 = fields.next()?.parse().ok()?;
    let minutes: i64 = match fields.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    let seconds: i64 = match fields.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if hours > 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }
    // POSIX offsets are west of UTC
    Some(-sign * (hours * 3600 + minutes * 60 + seconds))
}

/// Board settings for one activation
#[derive(Debug, Clone)]
pub struct HostBoardConfig {
    /// Directory standing in for the card
    pub card: PathBuf,
    /// File standing in for retained memory
    pub retained: PathBuf,
    /// Provisioning trigger held at boot
    pub provisioning: bool,
    /// Poll delay while resident
    pub poll: Duration,
}

impl HostBoardConfig {
    pub fn new(card: impl Into<PathBuf>, retained: impl Into<PathBuf>) -> Self {
        Self {
            card: card.into(),
            retained: retained.into(),
            provisioning: false,
            poll: millis(intervalcam_core::constants::time::IDLE_POLL_MS),
        }
    }
}

pub struct HostBoard {
    config: HostBoardConfig,
    clock: HostClock,
    wake: WakeCause,
    utc_offset: i64,
    suspend: Option<Duration>,
    fault: Option<Fault>,
}

impl HostBoard {
    pub fn new(config: HostBoardConfig, clock: HostClock, wake: WakeCause) -> Self {
        Self { config, clock, wake, utc_offset: 0, suspend: None, fault: None }
    }

    /// Suspend requested by this activation
    pub fn suspend_requested(&self) -> Option<Duration> {
        self.suspend
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn clock(&self) -> &HostClock {
        &self.clock
    }

    /// Seconds east of UTC applied by `local_time`
    pub fn utc_offset(&self) -> i64 {
        self.utc_offset
    }
}

impl Board for HostBoard {
    type Storage = FsStorage;

    fn mount_storage(&mut self) -> StorageResult<FsStorage> {
        FsStorage::mount(&self.config.card)
    }

    fn current_time(&mut self) -> Timestamp {
        self.clock.now()
    }

    fn set_timezone(&mut self, tz: &str) {
        self.utc_offset = match posix_tz_offset(tz) {
            Some(offset) => offset,
            None => {
                log::warn!("Timezone '{}' not understood, using UTC", tz);
                0
            }
        };
    }

    fn local_time(&mut self, at: Timestamp) -> Option<NaiveDateTime> {
        at.to_naive_utc()?
            .checked_add_signed(chrono::Duration::seconds(self.utc_offset))
    }

    fn wake_cause(&mut self) -> WakeCause {
        self.wake
    }

    fn provisioning_requested(&mut self) -> bool {
        self.config.provisioning
    }

    fn read_retained(&mut self) -> [u8; RETAINED_LEN] {
        let mut block = [0u8; RETAINED_LEN];
        match fs::read(&self.config.retained) {
            Ok(bytes) if bytes.len() == RETAINED_LEN => block.copy_from_slice(&bytes),
            Ok(bytes) => log::warn!("Retained block has {} bytes, ignoring", bytes.len()),
            Err(e) => log::debug!("No retained block: {}", e),
        }
        block
    }

    fn write_retained(&mut self, data: &[u8; RETAINED_LEN]) {
        if let Err(e) = fs::write(&self.config.retained, data) {
            log::error!("Failed to write retained block: {}", e);
        }
    }

    fn request_timed_suspend(&mut self, duration: Duration) {
        log::info!("Timed suspend for {} ms", duration.ticks() / 1000);
        self.suspend = Some(duration);
    }

    fn set_busy_indicator(&mut self, on: bool) {
        log::debug!("Busy LED {}", if on { "on" } else { "off" });
    }

    fn set_flash(&mut self, on: bool) {
        log::debug!("Flash {}", if on { "on" } else { "off" });
    }

    fn signal_fault(&mut self, fault: Fault) {
        log::error!("Fault indicator: {}", fault);
        self.fault = Some(fault);
    }

    fn idle(&mut self) {
        self.clock.wait(self.config.poll);
    }
}
