//! Session Directories
//!
//! Every fresh start of the device opens a new directory under the card
//! root; captures of one uninterrupted series all land in it:
//!
//! ```text
//! /sdcard/
//! ├── timelapse.conf
//! ├── timelapse0001/
//! │   ├── 20240101_120000.jpg
//! │   └── 20240101_120100.jpg
//! └── timelapse0002/
//! ```
//!
//! The root is listed once per activation. After a timer wake the highest
//! numbered directory is reused; otherwise the next number is created.
//! Directories are never deleted.

use core::fmt::Write;

use chrono::{Datelike, NaiveDateTime, Timelike};
use heapless::String;

use crate::constants::storage::{
    IMAGE_EXTENSION, MAX_PATH_LEN, MAX_SESSION_NUMBER, SESSION_DIGITS, SESSION_PREFIX,
    STORAGE_ROOT,
};
use crate::errors::{StorageError, StorageResult};
use crate::platform::Storage;

/// Fixed-capacity path
pub type PathBuf = String<MAX_PATH_LEN>;

/// The directory captures of this activation go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPath {
    /// Sequence number, 1..=9999
    pub number: u16,
    /// Absolute directory path
    pub path: PathBuf,
    /// Created during this activation (false when resumed)
    pub created: bool,
}

impl SessionPath {
    pub fn as_str(&self) -> &str {
        self.path.as_str()
    }

    /// `<session>/YYYYMMDD_HHMMSS.jpg` for a capture at local time `at`
    pub fn capture_file(&self, at: &NaiveDateTime) -> StorageResult<PathBuf> {
        let mut path = PathBuf::new();
        write!(
            path,
            "{}/{:04}{:02}{:02}_{:02}{:02}{:02}.{}",
            self.path,
            at.year(),
            at.month(),
            at.day(),
            at.hour(),
            at.minute(),
            at.second(),
            IMAGE_EXTENSION
        )
        .map_err(|_| StorageError::PathTooLong)?;
        Ok(path)
    }
}

/// Finds and creates session directories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDirectoryManager {
    root: &'static str,
    prefix: &'static str,
}

impl Default for SessionDirectoryManager {
    fn default() -> Self {
        Self::new(STORAGE_ROOT, SESSION_PREFIX)
    }
}

impl SessionDirectoryManager {
    pub const fn new(root: &'static str, prefix: &'static str) -> Self {
        Self { root, prefix }
    }

    pub fn root(&self) -> &'static str {
        self.root
    }

    /// Sequence number of a directory name, if it is prefix + exactly four
    /// ASCII digits. The prefix is matched ignoring ASCII case (FAT short
    /// names come back upper-case).
    pub fn parse_number(&self, name: &str) -> Option<u16> {
        let bytes = name.as_bytes();
        let prefix = self.prefix.as_bytes();
        if bytes.len() != prefix.len() + SESSION_DIGITS {
            return None;
        }
        if !bytes[..prefix.len()].eq_ignore_ascii_case(prefix) {
            return None;
        }
        parse_digits(&bytes[prefix.len()..])
    }

    /// Highest session number present under the root
    pub fn scan<S: Storage>(&self, storage: &mut S) -> StorageResult<Option<u16>> {
        let mut max: Option<u16> = None;
        storage.list_dir(self.root, &mut |name: &str| {
            if let Some(number) = self.parse_number(name) {
                max = Some(max.map_or(number, |m| m.max(number)));
            }
        })?;
        Ok(max)
    }

    /// Absolute path of session `number`
    pub fn path_for(&self, number: u16) -> StorageResult<PathBuf> {
        let mut path = PathBuf::new();
        write!(path, "{}/{}{:04}", self.root, self.prefix, number)
            .map_err(|_| StorageError::PathTooLong)?;
        Ok(path)
    }

    /// Pick the session directory for this activation
    ///
    /// With `resume` the highest existing session is returned and nothing
    /// is created; if there is none a fresh one is started instead. Without
    /// `resume` the next number is created.
    pub fn resolve<S: Storage>(&self, storage: &mut S, resume: bool) -> StorageResult<SessionPath> {
        let highest = self.scan(storage)?;

        if resume {
            if let Some(number) = highest {
                log_info!("Resuming session {}", number);
                return Ok(SessionPath { number, path: self.path_for(number)?, created: false });
            }
            log_warn!("No session to resume, starting a new one");
        }

        let number = match highest {
            None => 1,
            Some(n) if n >= MAX_SESSION_NUMBER => return Err(StorageError::SessionsExhausted),
            Some(n) => n + 1,
        };
        let path = self.path_for(number)?;
        storage.create_dir(&path)?;
        log_info!("Started session {}", number);
        Ok(SessionPath { number, path, created: true })
    }
}

fn parse_digits(digits: &[u8]) -> Option<u16> {
    let mut value: u16 = 0;
    for &d in digits {
        if !d.is_ascii_digit() {
            return None;
        }
        value = value * 10 + (d - b'0') as u16;
    }
    Some(value)
}
