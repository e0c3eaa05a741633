//! Device Settings
//!
//! ## Overview
//!
//! The settings file on the card is a flat list of `key = value` lines. It
//! is read once per activation into a typed [`Settings`] record that the
//! scheduler and the sensor driver consume.
//!
//! ```text
//! # Interval camera settings
//! interval = 30000
//! timezone = CET-1CEST,M3.5.0,M10.5.0/3
//! rotation = 90
//! framesize = SVGA
//! agc_gain = 4
//! ```
//!
//! ## Layers
//!
//! - [`kv`]: raw line classification (comments, blanks, `key = value`)
//! - [`keys`]: the key table; one entry per recognized key with its
//!   validator and its getter/setter
//! - [`store`]: [`ConfigStore`], the per-line apply policy plus load, save
//!   and snapshot
//!
//! ## Validation
//!
//! A rejected value never touches the field. Unknown keys are accepted and
//! ignored so newer files still load on older firmware. Three retired keys
//! (`ssid`, `password`, `ntp_server`) are reported as deprecated and
//! skipped.
//!
//! ```rust
//! use intervalcam_core::ConfigStore;
//! use intervalcam_core::config::FrameSize;
//!
//! let mut store = ConfigStore::new();
//! store.apply("framesize", "800x600")?;
//! store.apply("interval", "250")?; // clamped to one second
//!
//! assert_eq!(store.settings().frame_size(), FrameSize::Svga);
//! assert_eq!(store.settings().capture_interval_ms(), 1000);
//! # Ok::<(), intervalcam_core::ConfigError>(())
//! ```

pub mod keys;
pub mod kv;
pub mod store;
mod values;

pub use keys::{Applied, KeyKind, KeySpec, Value, KEYS};
pub use store::{ConfigStore, LoadReport, Snapshot};
pub use values::{Choice, FrameSize, Orientation, SpecialEffect, WbMode};

use crate::constants::camera::TIMEZONE_MAX_LEN;
use crate::constants::time::DEFAULT_CAPTURE_INTERVAL_MS;
use crate::time::{millis, Duration};

/// Bounded timezone descriptor
pub type TimezoneString = heapless::String<TIMEZONE_MAX_LEN>;

/// Validated device settings
///
/// Fields are only written through the key table, so every field holds
/// either its default or a value that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub(crate) capture_interval_ms: u32,
    pub(crate) timezone: TimezoneString,
    pub(crate) orientation: Orientation,
    pub(crate) enable_busy_led: bool,
    pub(crate) enable_flash: bool,
    pub(crate) training_shots: u32,

    pub(crate) frame_size: FrameSize,
    pub(crate) quality: u8,
    pub(crate) contrast: i8,
    pub(crate) brightness: i8,
    pub(crate) saturation: i8,
    pub(crate) colorbar: bool,
    pub(crate) hmirror: bool,
    pub(crate) vflip: bool,
    pub(crate) awb: bool,
    pub(crate) awb_gain: bool,
    pub(crate) wb_mode: WbMode,
    pub(crate) agc: bool,
    /// Zero-based; the file and snapshot use 1..=32
    pub(crate) agc_gain: u8,
    pub(crate) gain_ceiling: u8,
    pub(crate) aec: bool,
    pub(crate) aec_value: u16,
    pub(crate) aec2: bool,
    pub(crate) ae_level: i8,
    pub(crate) dcw: bool,
    pub(crate) bpc: bool,
    pub(crate) wpc: bool,
    pub(crate) raw_gma: bool,
    pub(crate) lenc: bool,
    pub(crate) special_effect: SpecialEffect,
}

impl Default for Settings {
    fn default() -> Self {
        let mut timezone = TimezoneString::new();
        // Fits: four bytes into a 63-byte buffer
        let _ = timezone.push_str("GMT0");

        Self {
            capture_interval_ms: DEFAULT_CAPTURE_INTERVAL_MS,
            timezone,
            orientation: Orientation::Normal,
            enable_busy_led: true,
            enable_flash: false,
            training_shots: 0,

            frame_size: FrameSize::Uxga,
            quality: 10,
            contrast: 0,
            brightness: 0,
            saturation: 0,
            colorbar: false,
            hmirror: false,
            vflip: false,
            awb: true,
            awb_gain: true,
            wb_mode: WbMode::Auto,
            agc: true,
            agc_gain: 0,
            gain_ceiling: 0,
            aec: true,
            aec_value: 300,
            aec2: false,
            ae_level: 0,
            dcw: true,
            bpc: false,
            wpc: true,
            raw_gma: true,
            lenc: true,
            special_effect: SpecialEffect::None,
        }
    }
}

impl Settings {
    /// Time between two captures
    pub fn capture_interval(&self) -> Duration {
        millis(self.capture_interval_ms as u64)
    }

    /// Time between two captures in milliseconds, at least one second
    pub fn capture_interval_ms(&self) -> u32 {
        self.capture_interval_ms
    }

    /// POSIX TZ descriptor handed to the board's clock
    pub fn timezone(&self) -> &str {
        self.timezone.as_str()
    }

    /// Image orientation written into the file header
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Light the busy LED while capturing
    pub fn enable_busy_led(&self) -> bool {
        self.enable_busy_led
    }

    /// Fire the flash LED during the kept capture
    pub fn enable_flash(&self) -> bool {
        self.enable_flash
    }

    /// Frames captured and thrown away before the kept one, so automatic
    /// exposure and white balance can settle after a cold sensor start
    pub fn training_shots(&self) -> u32 {
        self.training_shots
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// JPEG quality, 10 (best) to 63
    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn contrast(&self) -> i8 {
        self.contrast
    }

    pub fn brightness(&self) -> i8 {
        self.brightness
    }

    pub fn saturation(&self) -> i8 {
        self.saturation
    }

    /// Test pattern instead of image data
    pub fn colorbar(&self) -> bool {
        self.colorbar
    }

    pub fn hmirror(&self) -> bool {
        self.hmirror
    }

    pub fn vflip(&self) -> bool {
        self.vflip
    }

    /// Automatic white balance
    pub fn awb(&self) -> bool {
        self.awb
    }

    pub fn awb_gain(&self) -> bool {
        self.awb_gain
    }

    pub fn wb_mode(&self) -> WbMode {
        self.wb_mode
    }

    /// Automatic gain control
    pub fn agc(&self) -> bool {
        self.agc
    }

    /// Manual gain as the sensor register expects it (0..=31)
    pub fn agc_gain(&self) -> u8 {
        self.agc_gain
    }

    pub fn gain_ceiling(&self) -> u8 {
        self.gain_ceiling
    }

    /// Automatic exposure control
    pub fn aec(&self) -> bool {
        self.aec
    }

    /// Manual exposure (0..=1200)
    pub fn aec_value(&self) -> u16 {
        self.aec_value
    }

    /// Night mode exposure control
    pub fn aec2(&self) -> bool {
        self.aec2
    }

    pub fn ae_level(&self) -> i8 {
        self.ae_level
    }

    /// Downsize enable
    pub fn dcw(&self) -> bool {
        self.dcw
    }

    /// Black pixel correction
    pub fn bpc(&self) -> bool {
        self.bpc
    }

    /// White pixel correction
    pub fn wpc(&self) -> bool {
        self.wpc
    }

    pub fn raw_gma(&self) -> bool {
        self.raw_gma
    }

    /// Lens correction
    pub fn lenc(&self) -> bool {
        self.lenc
    }

    pub fn special_effect(&self) -> SpecialEffect {
        self.special_effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_key_ranges() {
        let settings = Settings::default();
        for spec in KEYS.iter() {
            if let KeyKind::Integer { min, max, .. } = spec.kind {
                let value = match spec.value(&settings) {
                    Some(Value::Integer(v)) => v,
                    other => panic!("{} rendered as {:?}", spec.name, other),
                };
                assert!(value >= min && value <= max, "default of {} out of range", spec.name);
            }
        }
    }

    #[test]
    fn default_interval() {
        let settings = Settings::default();
        assert_eq!(settings.capture_interval_ms(), 60_000);
        assert_eq!(settings.capture_interval().ticks(), 60_000_000);
        assert_eq!(settings.timezone(), "GMT0");
    }
}
