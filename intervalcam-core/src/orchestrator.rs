//! Capture Orchestrator
//!
//! ## Overview
//!
//! One activation of the device, from power-up (or timer wake) to the next
//! suspend. The orchestrator owns the settings, the schedule and the
//! session for that activation and drives the three collaborators in
//! [`crate::platform`].
//!
//! ```text
//!              boot()                       tick()
//!  ColdInit ───────────► Active ─────► AwaitingCapture ──┐
//!     │                    ▲                             │ not worth suspending
//!     │                    └─────────────────────────────┤
//!     │                                                  │ suspend_duration = Some
//!     │                                                  ▼
//!     │                                   Suspending ──► Suspended
//!     │
//!     ├── clock unset / trigger ──► ProvisioningMode(reason)
//!     └── mount, load, sensor, session failure ──► Halted(fault)
//! ```
//!
//! ## Cold init order
//!
//! 1. Mount storage
//! 2. Load the settings file; a rejected file halts unless the trigger is
//!    held or the clock is unset
//! 3. Check the wall clock and the provisioning trigger
//! 4. Apply the timezone, start the sensor
//! 5. Restore (timer wake) or start the schedule
//! 6. Resolve the session directory
//!
//! ## Capture failures
//!
//! A failed capture or a failed file write skips that frame; the deadline
//! still advances so the series stays on its grid. Catch-up captures after a
//! late wake that land on the previous frame's file name are skipped rather
//! than overwriting it. Only cold init failures halt the device.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut orchestrator = Orchestrator::new(board, camera);
//! match orchestrator.run() {
//!     State::Suspended => {}          // next activation starts at cold init
//!     State::ProvisioningMode(_) => {} // hand over to the provisioning UI
//!     State::Halted(fault) => {}
//!     _ => unreachable!(),
//! }
//! ```

use crate::config::{ConfigStore, Settings};
use crate::constants::storage::CONFIG_PATH;
use crate::errors::{CaptureError, Fault, LoadError, StorageError, StorageResult};
use crate::platform::{Board, Camera, FileSink, Storage};
use crate::schedule::{PersistedSchedule, ScheduleClock, SchedulePolicy};
use crate::session::{PathBuf, SessionDirectoryManager, SessionPath};
use crate::time::Timestamp;

/// Why the device is waiting for user setup instead of capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProvisioningReason {
    /// Wall clock never set
    ClockUnset,
    /// Provisioning trigger held at a non-timer boot
    Requested,
    /// Settings file rejected while the trigger was held
    InvalidSettings,
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    ColdInit,
    /// Polling for the next deadline
    Active,
    /// Inside a tick: due check and capture
    AwaitingCapture,
    /// Writing retained state ahead of a suspend
    Suspending,
    /// Suspend requested; on hardware control never comes back
    Suspended,
    ProvisioningMode(ProvisioningReason),
    /// Terminal
    Halted(Fault),
}

/// Why a due capture produced no file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    Sensor(CaptureError),
    Storage(StorageError),
    /// No local calendar time to name the file
    Clock,
    /// Same file name as the previous frame; catch-up captures within one
    /// second would overwrite it
    Collision,
}

impl From<StorageError> for SkipReason {
    fn from(err: StorageError) -> Self {
        SkipReason::Storage(err)
    }
}

/// Capture counters for one activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frames written
    pub captured: u32,
    /// Due captures that produced no file
    pub skipped: u32,
    pub last_skip: Option<SkipReason>,
    pub last_file: Option<PathBuf>,
}

/// Drives one activation
pub struct Orchestrator<B: Board, C: Camera> {
    board: B,
    camera: C,
    config: ConfigStore,
    config_path: &'static str,
    policy: SchedulePolicy,
    sessions: SessionDirectoryManager,
    storage: Option<B::Storage>,
    clock: Option<ScheduleClock>,
    session: Option<SessionPath>,
    state: State,
    resumed: bool,
    stats: CaptureStats,
}

impl<B: Board, C: Camera> Orchestrator<B, C> {
    pub fn new(board: B, camera: C) -> Self {
        Self {
            board,
            camera,
            config: ConfigStore::new(),
            config_path: CONFIG_PATH,
            policy: SchedulePolicy::default(),
            sessions: SessionDirectoryManager::default(),
            storage: None,
            clock: None,
            session: None,
            state: State::ColdInit,
            resumed: false,
            stats: CaptureStats::default(),
        }
    }

    /// Override the suspend thresholds
    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the session root and prefix
    pub fn with_sessions(mut self, sessions: SessionDirectoryManager) -> Self {
        self.sessions = sessions;
        self
    }

    /// Override the settings file location
    pub fn with_config_path(mut self, path: &'static str) -> Self {
        self.config_path = path;
        self
    }

    /// Run cold init; no effect outside `ColdInit`
    pub fn boot(&mut self) -> State {
        if self.state != State::ColdInit {
            return self.state;
        }

        let wake = self.board.wake_cause();
        let resume = wake.is_timer();
        let trigger = !resume && self.board.provisioning_requested();
        log_info!("Cold init, wake cause {:?}", wake);

        let mut storage = match self.board.mount_storage() {
            Ok(storage) => storage,
            Err(err) => return self.halt(Fault::Storage(err)),
        };

        let loaded = self.config.load(&mut storage, self.config_path);
        self.storage = Some(storage);
        let now = self.board.current_time();
        match loaded {
            Ok(_) => {}
            Err(LoadError::Invalid { .. }) if trigger => {
                return self.enter_provisioning(ProvisioningReason::InvalidSettings);
            }
            // Provisioning for the clock can repair the file as well
            Err(LoadError::Invalid { .. }) if !now.is_plausible() => {}
            Err(err) => return self.halt(Fault::Config(err)),
        }

        if !now.is_plausible() {
            log_warn!("Clock not set ({} s since epoch)", now.as_secs());
            return self.enter_provisioning(ProvisioningReason::ClockUnset);
        }
        if trigger {
            return self.enter_provisioning(ProvisioningReason::Requested);
        }

        let settings = self.config.settings();
        self.board.set_timezone(settings.timezone());
        if let Err(err) = self.camera.init(settings) {
            return self.halt(Fault::Sensor(err));
        }

        let clock = self.restore_clock(resume, now);
        self.clock = Some(clock);

        let resolved = match self.storage.as_mut() {
            Some(storage) => self.sessions.resolve(storage, resume),
            None => Err(StorageError::MountFailed),
        };
        match resolved {
            Ok(session) => self.session = Some(session),
            Err(err) => return self.halt(Fault::Storage(err)),
        }

        self.resumed = resume;
        self.state = State::Active;
        log_info!(
            "Active, next capture in {} ms",
            clock.time_to_deadline(now).max(0) / 1000
        );
        self.state
    }

    fn restore_clock(&mut self, resume: bool, now: Timestamp) -> ScheduleClock {
        let interval = self.config.settings().capture_interval();
        let clock = if resume {
            match PersistedSchedule::from_bytes(&self.board.read_retained()) {
                Ok(record) => ScheduleClock::resume(record.deadline, interval),
                Err(err) => {
                    log_warn!("{}, restarting schedule", err);
                    ScheduleClock::starting_at(now, interval)
                }
            }
        } else {
            ScheduleClock::starting_at(now, interval)
        };
        clock.with_policy(self.policy)
    }

    /// One poll: capture if due, then suspend if worthwhile
    ///
    /// No effect outside `Active`.
    pub fn tick(&mut self) -> State {
        if self.state != State::Active {
            return self.state;
        }
        let mut clock = match self.clock {
            Some(clock) => clock,
            None => return self.state,
        };

        self.state = State::AwaitingCapture;
        let now = self.board.current_time();
        if clock.due(now) {
            match self.capture(now) {
                Ok(path) => {
                    log_info!("Saved {}", path.as_str());
                    self.stats.captured += 1;
                    self.stats.last_file = Some(path);
                }
                Err(reason) => {
                    log_warn!("Capture skipped: {:?}", reason);
                    self.stats.skipped += 1;
                    self.stats.last_skip = Some(reason);
                }
            }
            clock.advance();
            self.clock = Some(clock);
        }

        let now = self.board.current_time();
        match clock.suspend_duration(now) {
            Some(duration) => {
                self.state = State::Suspending;
                self.board.write_retained(&clock.persist().to_bytes());
                log_info!("Suspending for {} ms", duration.ticks() / 1000);
                self.board.request_timed_suspend(duration);
                self.state = State::Suspended;
            }
            None => self.state = State::Active,
        }
        self.state
    }

    fn capture(&mut self, now: Timestamp) -> Result<PathBuf, SkipReason> {
        let local = self.board.local_time(now).ok_or(SkipReason::Clock)?;
        let session = self.session.as_ref().ok_or(StorageError::OpenFailed)?;
        let path = session.capture_file(&local)?;
        if self.stats.last_file.as_ref() == Some(&path) {
            return Err(SkipReason::Collision);
        }

        let settings = self.config.settings();
        let busy_led = settings.enable_busy_led();
        let flash = settings.enable_flash();
        let training_shots = settings.training_shots();

        if busy_led {
            self.board.set_busy_indicator(true);
        }

        for _ in 0..training_shots {
            if let Err(err) = self.camera.capture_frame() {
                log_debug!("Training shot failed: {}", err);
            }
        }

        if flash {
            self.board.set_flash(true);
        }
        let frame = self.camera.capture_frame();
        if flash {
            self.board.set_flash(false);
        }

        let result = match frame {
            Ok(frame) => self.write_frame(&path, &frame).map(|()| path),
            Err(err) => Err(SkipReason::Sensor(err)),
        };

        if busy_led {
            self.board.set_busy_indicator(false);
        }
        result
    }

    fn write_frame(&mut self, path: &str, frame: &C::Frame) -> Result<(), SkipReason> {
        let header = self.camera.frame_header_bytes(frame, self.config.settings());

        let storage = self.storage.as_mut().ok_or(StorageError::OpenFailed)?;
        let mut file = storage.open_write(path)?;
        if !header.is_empty() {
            file.write_all(&header)?;
        }
        file.write_all(frame.as_ref())?;
        file.close()?;
        Ok(())
    }

    /// Boot if needed, then tick until the state leaves `Active`
    pub fn run(&mut self) -> State {
        if self.state == State::ColdInit {
            self.boot();
        }
        while self.state == State::Active {
            self.tick();
            if self.state == State::Active {
                self.board.idle();
            }
        }
        self.state
    }

    /// Enter the terminal state; the fault is signalled once
    pub fn halt(&mut self, fault: Fault) -> State {
        if let State::Halted(_) = self.state {
            return self.state;
        }
        log_error!("Halted: {}", fault);
        self.state = State::Halted(fault);
        self.board.signal_fault(fault);
        self.state
    }

    fn enter_provisioning(&mut self, reason: ProvisioningReason) -> State {
        log_warn!("Entering provisioning mode: {:?}", reason);
        self.state = State::ProvisioningMode(reason);
        self.state
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        self.config.settings()
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Settings store for the provisioning UI
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    /// Write the current settings back to the card
    pub fn save_settings(&mut self) -> StorageResult<()> {
        let storage = self.storage.as_mut().ok_or(StorageError::MountFailed)?;
        self.config.save(storage, self.config_path)
    }

    pub fn schedule(&self) -> Option<&ScheduleClock> {
        self.clock.as_ref()
    }

    pub fn session(&self) -> Option<&SessionPath> {
        self.session.as_ref()
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// This activation continues the previous session
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn storage_mut(&mut self) -> Option<&mut B::Storage> {
        self.storage.as_mut()
    }

    pub fn into_parts(self) -> (B, C, Option<B::Storage>) {
        (self.board, self.camera, self.storage)
    }
}
