//! Shared test rig for integration tests
//!
//! Provides in-memory stand-ins for the three collaborators:
//! - `MemStorage`: a card with directories and files kept in maps
//! - `MockBoard`: settable clock, wake cause and retained memory, and a log
//!   of every suspend, fault and LED change
//! - `MockCamera`: numbered fake frames with scripted failures
//!
//! The card, the retained block and the clock live in a `Rig` and outlive
//! any single activation, so a test can boot, suspend, and boot again.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use intervalcam_core::constants::storage::RETAINED_LEN;
use intervalcam_core::constants::NOT_BEFORE_TIME;
use intervalcam_core::{
    Board, Camera, CaptureError, Duration, Fault, FileSink, Orchestrator, PersistedSchedule,
    Settings, Storage, StorageError, StorageResult, Timestamp, WakeCause,
};

pub const START_SECS: u64 = 1_700_000_000;

/// Card contents and injected failures
#[derive(Debug, Default)]
pub struct Card {
    pub dirs: BTreeSet<String>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_open: bool,
    pub fail_write: bool,
}

impl Card {
    /// Entries directly below `dir`
    pub fn children(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.dirs
            .iter()
            .chain(self.files.keys())
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_owned)
            .collect()
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }
}

pub type SharedCard = Rc<RefCell<Card>>;

pub struct MemStorage {
    card: SharedCard,
}

impl MemStorage {
    pub fn new(card: SharedCard) -> Self {
        Self { card }
    }
}

pub struct MemFile {
    card: SharedCard,
    path: String,
    data: Vec<u8>,
}

impl FileSink for MemFile {
    fn write_all(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.card.borrow().fail_write {
            return Err(StorageError::WriteFailed);
        }
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn close(self) -> StorageResult<()> {
        self.card.borrow_mut().files.insert(self.path, self.data);
        Ok(())
    }
}

impl Storage for MemStorage {
    type File = MemFile;

    fn list_dir(&mut self, path: &str, visit: &mut dyn FnMut(&str)) -> StorageResult<()> {
        let card = self.card.borrow();
        if card.fail_list {
            return Err(StorageError::ListFailed);
        }
        for name in card.children(path) {
            visit(&name);
        }
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> StorageResult<()> {
        let mut card = self.card.borrow_mut();
        if card.fail_create {
            return Err(StorageError::CreateDirFailed);
        }
        card.dirs.insert(path.to_owned());
        Ok(())
    }

    fn open_write(&mut self, path: &str) -> StorageResult<MemFile> {
        if self.card.borrow().fail_open {
            return Err(StorageError::OpenFailed);
        }
        Ok(MemFile { card: self.card.clone(), path: path.to_owned(), data: Vec::new() })
    }

    fn read_to_string(&mut self, path: &str) -> StorageResult<Option<String>> {
        match self.card.borrow().files.get(path) {
            Some(bytes) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|_| StorageError::ReadFailed),
            None => Ok(None),
        }
    }
}

/// State that survives suspends: card, retained block, wall clock
#[derive(Clone)]
pub struct Rig {
    pub card: SharedCard,
    pub retained: Rc<Cell<[u8; RETAINED_LEN]>>,
    pub now: Rc<Cell<Timestamp>>,
}

impl Rig {
    pub fn new() -> Self {
        Self::at(Timestamp::from_secs(START_SECS))
    }

    pub fn at(now: Timestamp) -> Self {
        Self {
            card: Rc::new(RefCell::new(Card::default())),
            retained: Rc::new(Cell::new([0; RETAINED_LEN])),
            now: Rc::new(Cell::new(now)),
        }
    }

    /// Rig whose clock was never set
    pub fn unset_clock() -> Self {
        Self::at(Timestamp::from_secs(NOT_BEFORE_TIME - 1_000_000))
    }

    pub fn with_dirs(self, names: &[&str]) -> Self {
        {
            let mut card = self.card.borrow_mut();
            for name in names {
                card.dirs.insert(format!("/sdcard/{}", name));
            }
        }
        self
    }

    pub fn with_config(self, text: &str) -> Self {
        self.card
            .borrow_mut()
            .files
            .insert("/sdcard/timelapse.conf".to_owned(), text.as_bytes().to_vec());
        self
    }

    pub fn board(&self, wake: WakeCause) -> MockBoard {
        MockBoard {
            card: self.card.clone(),
            retained: self.retained.clone(),
            now: self.now.clone(),
            wake,
            provisioning: false,
            mount_fails: false,
            idle_step: Duration::from_ticks(10_000),
            suspends: Vec::new(),
            faults: Vec::new(),
            busy: Vec::new(),
            flash: Vec::new(),
            timezone: None,
            idles: 0,
        }
    }

    pub fn orchestrator(&self, wake: WakeCause) -> Orchestrator<MockBoard, MockCamera> {
        Orchestrator::new(self.board(wake), MockCamera::default())
    }

    pub fn now(&self) -> Timestamp {
        self.now.get()
    }

    pub fn set_now(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    /// Deadline stored by the last suspend
    pub fn retained_deadline(&self) -> Option<Timestamp> {
        PersistedSchedule::from_bytes(&self.retained.get()).ok().map(|r| r.deadline)
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.card.borrow().file(path).map(<[u8]>::to_vec)
    }

    pub fn has_dir(&self, name: &str) -> bool {
        self.card.borrow().dirs.contains(&format!("/sdcard/{}", name))
    }

    pub fn dir_count(&self) -> usize {
        self.card.borrow().dirs.len()
    }

    /// Files below `dir`, sorted
    pub fn files_in(&self, dir: &str) -> Vec<String> {
        self.card.borrow().children(&format!("/sdcard/{}", dir))
    }
}

pub struct MockBoard {
    card: SharedCard,
    retained: Rc<Cell<[u8; RETAINED_LEN]>>,
    now: Rc<Cell<Timestamp>>,
    pub wake: WakeCause,
    pub provisioning: bool,
    pub mount_fails: bool,
    pub idle_step: Duration,
    pub suspends: Vec<Duration>,
    pub faults: Vec<Fault>,
    pub busy: Vec<bool>,
    pub flash: Vec<bool>,
    pub timezone: Option<String>,
    pub idles: u32,
}

impl Board for MockBoard {
    type Storage = MemStorage;

    fn mount_storage(&mut self) -> StorageResult<MemStorage> {
        if self.mount_fails {
            return Err(StorageError::MountFailed);
        }
        Ok(MemStorage::new(self.card.clone()))
    }

    fn current_time(&mut self) -> Timestamp {
        self.now.get()
    }

    fn set_timezone(&mut self, tz: &str) {
        self.timezone = Some(tz.to_owned());
    }

    fn wake_cause(&mut self) -> WakeCause {
        self.wake
    }

    fn provisioning_requested(&mut self) -> bool {
        self.provisioning
    }

    fn read_retained(&mut self) -> [u8; RETAINED_LEN] {
        self.retained.get()
    }

    fn write_retained(&mut self, data: &[u8; RETAINED_LEN]) {
        self.retained.set(*data);
    }

    fn request_timed_suspend(&mut self, duration: Duration) {
        self.suspends.push(duration);
    }

    fn set_busy_indicator(&mut self, on: bool) {
        self.busy.push(on);
    }

    fn set_flash(&mut self, on: bool) {
        self.flash.push(on);
    }

    fn signal_fault(&mut self, fault: Fault) {
        self.faults.push(fault);
    }

    fn idle(&mut self) {
        self.idles += 1;
        self.now.set(self.now.get() + self.idle_step);
    }
}

#[derive(Default)]
pub struct MockCamera {
    pub fail_init: bool,
    /// Number of upcoming captures that fail
    pub fail_captures: u32,
    pub header: Vec<u8>,
    pub inits: u32,
    pub captures: u32,
    pub init_quality: Option<u8>,
}

impl Camera for MockCamera {
    type Frame = Vec<u8>;

    fn init(&mut self, settings: &Settings) -> Result<(), CaptureError> {
        self.inits += 1;
        self.init_quality = Some(settings.quality());
        if self.fail_init {
            Err(CaptureError::SensorInit)
        } else {
            Ok(())
        }
    }

    fn capture_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.captures += 1;
        if self.fail_captures > 0 {
            self.fail_captures -= 1;
            return Err(CaptureError::CaptureFailed);
        }
        Ok(format!("FRAME{}", self.captures).into_bytes())
    }

    fn frame_header_bytes(&mut self, _frame: &Vec<u8>, _settings: &Settings) -> Vec<u8> {
        self.header.clone()
    }
}

/// Capture file name for the rig's start time plus `offset_secs`
pub fn capture_name(offset_secs: u64) -> String {
    let at = Timestamp::from_secs(START_SECS + offset_secs).to_naive_utc().unwrap();
    at.format("%Y%m%d_%H%M%S.jpg").to_string()
}
