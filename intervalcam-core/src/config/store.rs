//! Settings store: per-line apply policy, load, save and snapshot

use alloc::string::String;
use core::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{ConfigResult, LoadError, StorageResult};
use crate::platform::{FileSink, Storage};

use super::keys::{live_keys, lookup, Applied, Value};
use super::kv::{self, Line};
use super::Settings;

/// Counters from one load pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// The file existed
    pub found: bool,
    /// Lines read, including blanks and comments
    pub lines: usize,
    /// Fields changed
    pub updated: usize,
    /// Keys not in the table
    pub unknown: usize,
    /// Retired keys seen
    pub deprecated: usize,
    /// Values that failed validation
    pub rejected: usize,
    /// Lines that were not `key = value`
    pub malformed: usize,
}

impl LoadReport {
    /// No rejected values and no malformed lines
    pub fn is_success(&self) -> bool {
        self.rejected == 0 && self.malformed == 0
    }

    fn into_result(self) -> Result<LoadReport, LoadError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(LoadError::Invalid { rejected: self.rejected, malformed: self.malformed })
        }
    }
}

/// Owner of the validated [`Settings`] for one activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    settings: Settings,
}

impl ConfigStore {
    /// Store holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Validate one pair and store it
    ///
    /// Unknown and deprecated keys are not errors; the returned [`Applied`]
    /// tells them apart. On `Err` nothing changed.
    pub fn apply(&mut self, key: &str, value: &str) -> ConfigResult<Applied> {
        match lookup(key) {
            Some(spec) => {
                let applied = spec.apply(&mut self.settings, value)?;
                if applied == Applied::Deprecated {
                    log_warn!("Setting '{}' is no longer supported and was ignored", spec.name);
                }
                Ok(applied)
            }
            None => {
                log_info!("Unknown setting '{}' ignored", key);
                Ok(Applied::Unknown)
            }
        }
    }

    /// Same as [`ConfigStore::apply`]; entry point for the provisioning UI
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<Applied> {
        self.apply(key, value)
    }

    /// Current value of `key` in file units
    pub fn get(&self, key: &str) -> Option<Value<'_>> {
        lookup(key).and_then(|spec| spec.value(&self.settings))
    }

    /// Apply every line of `text`
    ///
    /// Bad lines are counted and skipped; the good ones are applied either
    /// way. Any bad line makes the result `Err(LoadError::Invalid)`.
    pub fn load_str(&mut self, text: &str) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport { found: true, ..LoadReport::default() };

        for (number, line) in kv::lines(text) {
            report.lines = number;
            match line {
                Line::Blank | Line::Comment => {}
                Line::Malformed => {
                    log_warn!("Settings line {} is not 'key = value'", number);
                    report.malformed += 1;
                }
                Line::Pair { key, value } => match self.apply(key, value) {
                    Ok(Applied::Updated) => report.updated += 1,
                    Ok(Applied::Unknown) => report.unknown += 1,
                    Ok(Applied::Deprecated) => report.deprecated += 1,
                    Err(err) => {
                        log_warn!("Settings line {}: {}", number, err);
                        report.rejected += 1;
                    }
                },
            }
        }

        log_debug!(
            "Settings: {} updated, {} unknown, {} rejected, {} malformed",
            report.updated,
            report.unknown,
            report.rejected,
            report.malformed
        );
        report.into_result()
    }

    /// Load the settings file at `path`; a missing file keeps the defaults
    pub fn load<S: Storage>(&mut self, storage: &mut S, path: &str) -> Result<LoadReport, LoadError> {
        match storage.read_to_string(path)? {
            Some(text) => self.load_str(&text),
            None => {
                log_info!("No settings file, using defaults");
                Ok(LoadReport::default())
            }
        }
    }

    /// Write the settings file text: a header, then one line per key
    pub fn render<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str("# Interval camera settings\n")?;
        writeln!(out, "# Written by intervalcam {}", crate::VERSION)?;
        for spec in live_keys() {
            if let Some(value) = spec.value(&self.settings) {
                writeln!(out, "{} = {}", spec.name, value)?;
            }
        }
        Ok(())
    }

    /// [`ConfigStore::render`] into a new string
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail
        let _ = self.render(&mut text);
        text
    }

    /// Write the settings file to `path`, replacing any previous one
    pub fn save<S: Storage>(&self, storage: &mut S, path: &str) -> StorageResult<()> {
        let text = self.to_text();
        let mut file = storage.open_write(path)?;
        file.write_all(text.as_bytes())?;
        file.close()
    }

    /// Serializable view of every live key
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot { settings: &self.settings }
    }

    /// Compact JSON object of the snapshot
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}

/// Flat map of key name to value, in table order
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    settings: &'a Settings,
}

impl Serialize for Snapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(live_keys().count()))?;
        for spec in live_keys() {
            if let Some(value) = spec.value(self.settings) {
                map.serialize_entry(spec.name, &value)?;
            }
        }
        map.end()
    }
}
