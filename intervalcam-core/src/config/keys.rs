//! Key table
//!
//! Every recognized settings key is one [`KeySpec`] in [`KEYS`]. The entry
//! carries the validation class and the accessors for its field, so load,
//! save, `get` and the snapshot are all driven by the same table. Table
//! order is the canonical order of a saved file.

use core::fmt;

use serde::{Serialize, Serializer};

use crate::constants::camera::{
    AEC_VALUE_MAX, AEC_VALUE_MIN, AGC_GAIN_MAX, AGC_GAIN_MIN, GAIN_CEILING_MAX,
    GAIN_CEILING_MIN, LEVEL_MAX, LEVEL_MIN, QUALITY_MAX, QUALITY_MIN, TIMEZONE_MAX_LEN,
};
use crate::constants::time::MIN_CAPTURE_INTERVAL_MS;
use crate::errors::{ConfigError, ConfigResult};

use super::values::{Choice, FrameSize, Orientation, SpecialEffect, WbMode};
use super::Settings;

/// A field rendered in external units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// Plain number (rotation in degrees, gain 1-based)
    Integer(i64),
    /// Flag
    Boolean(bool),
    /// Enumeration name or free text
    Text(&'a str),
}

impl fmt::Display for Value<'_> {
    /// Spelling accepted back by the parser
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Boolean(true) => f.write_str("true"),
            Value::Boolean(false) => f.write_str("false"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value<'_> {
    /// Booleans are rendered as 0/1
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Value::Integer(v) => serializer.serialize_i64(v),
            Value::Boolean(b) => serializer.serialize_u8(u8::from(b)),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Type-erased accessors for an enumerated field
pub trait ChoiceField: Sync {
    /// Parse `value` and store it; false if no alias matched
    fn store(&self, settings: &mut Settings, value: &str) -> bool;

    /// Canonical name of the current value
    fn render(&self, settings: &Settings) -> &'static str;
}

/// Accessors for one field of a [`Choice`] type
pub struct ChoiceKey<T: Choice> {
    get: fn(&Settings) -> T,
    set: fn(&mut Settings, T),
}

impl<T: Choice> ChoiceField for ChoiceKey<T> {
    fn store(&self, settings: &mut Settings, value: &str) -> bool {
        match T::parse(value) {
            Some(choice) => {
                (self.set)(settings, choice);
                true
            }
            None => false,
        }
    }

    fn render(&self, settings: &Settings) -> &'static str {
        (self.get)(settings).name()
    }
}

/// Validation class and accessors of one key
#[derive(Clone, Copy)]
pub enum KeyKind {
    /// Base-10 integer within `min..=max`; `set` may remap or clamp and
    /// returns false if the value cannot be represented
    Integer {
        min: i64,
        max: i64,
        get: fn(&Settings) -> i64,
        set: fn(&mut Settings, i64) -> bool,
    },
    /// `true`/`yes`/`1` or `false`/`no`/`0`
    Boolean {
        get: fn(&Settings) -> bool,
        set: fn(&mut Settings, bool),
    },
    /// Case-insensitive alias table
    Choice(&'static dyn ChoiceField),
    /// Free text up to `max_len` bytes
    Text {
        max_len: usize,
        get: fn(&Settings) -> &str,
        set: fn(&mut Settings, &str),
    },
    /// Retired key: reported and ignored
    Deprecated,
}

/// Outcome of a successful [`KeySpec::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Field updated
    Updated,
    /// Key not in the table; nothing changed
    Unknown,
    /// Retired key; nothing changed
    Deprecated,
}

/// One recognized key
#[derive(Clone, Copy)]
pub struct KeySpec {
    /// Canonical lowercase name used on save and in snapshots
    pub name: &'static str,
    /// Validator and accessors
    pub kind: KeyKind,
}

impl fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySpec").field("name", &self.name).finish_non_exhaustive()
    }
}

impl KeySpec {
    /// Validate `value` and store it; on error the field is untouched
    pub fn apply(&self, settings: &mut Settings, value: &str) -> ConfigResult<Applied> {
        let key = self.name;
        match self.kind {
            KeyKind::Integer { min, max, set, .. } => {
                let parsed = parse_int(value).ok_or(ConfigError::NotAnInteger { key })?;
                if parsed < min || parsed > max {
                    return Err(ConfigError::OutOfRange { key, value: parsed, min, max });
                }
                if !set(settings, parsed) {
                    return Err(ConfigError::Unsupported { key, value: parsed });
                }
            }
            KeyKind::Boolean { set, .. } => {
                let parsed = parse_bool(value).ok_or(ConfigError::NotABoolean { key })?;
                set(settings, parsed);
            }
            KeyKind::Choice(field) => {
                if !field.store(settings, value) {
                    return Err(ConfigError::UnknownChoice { key });
                }
            }
            KeyKind::Text { max_len, set, .. } => {
                if value.len() > max_len {
                    return Err(ConfigError::TooLong { key, len: value.len(), max: max_len });
                }
                if value.trim() != value || value.chars().any(char::is_control) {
                    return Err(ConfigError::InvalidText { key });
                }
                set(settings, value);
            }
            KeyKind::Deprecated => return Ok(Applied::Deprecated),
        }
        Ok(Applied::Updated)
    }

    /// Current value in external units; `None` for deprecated keys
    pub fn value<'a>(&self, settings: &'a Settings) -> Option<Value<'a>> {
        match self.kind {
            KeyKind::Integer { get, .. } => Some(Value::Integer(get(settings))),
            KeyKind::Boolean { get, .. } => Some(Value::Boolean(get(settings))),
            KeyKind::Choice(field) => Some(Value::Text(field.render(settings))),
            KeyKind::Text { get, .. } => Some(Value::Text(get(settings))),
            KeyKind::Deprecated => None,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self.kind, KeyKind::Deprecated)
    }
}

/// Find a key, ignoring ASCII case
pub fn lookup(key: &str) -> Option<&'static KeySpec> {
    KEYS.iter().find(|spec| spec.name.eq_ignore_ascii_case(key))
}

/// Keys that carry a value, in canonical order
pub fn live_keys() -> impl Iterator<Item = &'static KeySpec> {
    KEYS.iter().filter(|spec| !spec.is_deprecated())
}

/// Parse a base-10 integer with optional sign
pub fn parse_int(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

/// Parse one of the accepted boolean spellings
pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value.eq_ignore_ascii_case("no") || value == "0" {
        Some(false)
    } else {
        None
    }
}

// ===== FIELD ACCESSORS =====

fn set_interval(settings: &mut Settings, value: i64) -> bool {
    // Range check already bounds the value to u32
    let requested = value as u32;
    if requested < MIN_CAPTURE_INTERVAL_MS {
        log_info!("Capture interval {} ms too small, using {} ms", requested, MIN_CAPTURE_INTERVAL_MS);
    }
    settings.capture_interval_ms = requested.max(MIN_CAPTURE_INTERVAL_MS);
    true
}

fn set_rotation(settings: &mut Settings, value: i64) -> bool {
    match Orientation::from_degrees(value) {
        Some(orientation) => {
            settings.orientation = orientation;
            true
        }
        None => false,
    }
}

fn get_timezone(settings: &Settings) -> &str {
    settings.timezone.as_str()
}

fn set_timezone(settings: &mut Settings, value: &str) {
    settings.timezone.clear();
    // Length checked against TIMEZONE_MAX_LEN before the call
    let _ = settings.timezone.push_str(value);
}

static FRAMESIZE: ChoiceKey<FrameSize> = ChoiceKey {
    get: |s| s.frame_size,
    set: |s, v| s.frame_size = v,
};

static WB_MODE: ChoiceKey<WbMode> = ChoiceKey {
    get: |s| s.wb_mode,
    set: |s, v| s.wb_mode = v,
};

static SPECIAL_EFFECT: ChoiceKey<SpecialEffect> = ChoiceKey {
    get: |s| s.special_effect,
    set: |s, v| s.special_effect = v,
};

macro_rules! boolean {
    ($name:literal, $field:ident) => {
        KeySpec {
            name: $name,
            kind: KeyKind::Boolean {
                get: |s| s.$field,
                set: |s, v| s.$field = v,
            },
        }
    };
}

macro_rules! level {
    ($name:literal, $field:ident) => {
        KeySpec {
            name: $name,
            kind: KeyKind::Integer {
                min: LEVEL_MIN,
                max: LEVEL_MAX,
                get: |s| s.$field as i64,
                set: |s, v| {
                    s.$field = v as i8;
                    true
                },
            },
        }
    };
}

/// Every recognized key in canonical save order
pub static KEYS: &[KeySpec] = &[
    KeySpec {
        name: "interval",
        kind: KeyKind::Integer {
            min: 0,
            max: u32::MAX as i64,
            get: |s| s.capture_interval_ms as i64,
            set: set_interval,
        },
    },
    boolean!("enable_busy_led", enable_busy_led),
    boolean!("enable_flash", enable_flash),
    KeySpec {
        name: "training_shots",
        kind: KeyKind::Integer {
            min: 0,
            max: u32::MAX as i64,
            get: |s| s.training_shots as i64,
            set: |s, v| {
                s.training_shots = v as u32;
                true
            },
        },
    },
    KeySpec {
        name: "timezone",
        kind: KeyKind::Text {
            max_len: TIMEZONE_MAX_LEN,
            get: get_timezone,
            set: set_timezone,
        },
    },
    KeySpec {
        name: "rotation",
        kind: KeyKind::Integer {
            min: -270,
            max: 270,
            get: |s| s.orientation.degrees() as i64,
            set: set_rotation,
        },
    },
    KeySpec { name: "framesize", kind: KeyKind::Choice(&FRAMESIZE) },
    KeySpec {
        name: "quality",
        kind: KeyKind::Integer {
            min: QUALITY_MIN,
            max: QUALITY_MAX,
            get: |s| s.quality as i64,
            set: |s, v| {
                s.quality = v as u8;
                true
            },
        },
    },
    level!("contrast", contrast),
    level!("brightness", brightness),
    level!("saturation", saturation),
    boolean!("colorbar", colorbar),
    boolean!("hmirror", hmirror),
    boolean!("vflip", vflip),
    boolean!("awb", awb),
    boolean!("awb_gain", awb_gain),
    KeySpec { name: "wb_mode", kind: KeyKind::Choice(&WB_MODE) },
    boolean!("agc", agc),
    KeySpec {
        name: "agc_gain",
        kind: KeyKind::Integer {
            min: AGC_GAIN_MIN,
            max: AGC_GAIN_MAX,
            get: |s| s.agc_gain as i64 + 1,
            set: |s, v| {
                s.agc_gain = (v - 1) as u8;
                true
            },
        },
    },
    KeySpec {
        name: "gainceiling",
        kind: KeyKind::Integer {
            min: GAIN_CEILING_MIN,
            max: GAIN_CEILING_MAX,
            get: |s| s.gain_ceiling as i64,
            set: |s, v| {
                s.gain_ceiling = v as u8;
                true
            },
        },
    },
    boolean!("aec", aec),
    KeySpec {
        name: "aec_value",
        kind: KeyKind::Integer {
            min: AEC_VALUE_MIN,
            max: AEC_VALUE_MAX,
            get: |s| s.aec_value as i64,
            set: |s, v| {
                s.aec_value = v as u16;
                true
            },
        },
    },
    boolean!("aec2", aec2),
    level!("ae_level", ae_level),
    boolean!("dcw", dcw),
    boolean!("bpc", bpc),
    boolean!("wpc", wpc),
    boolean!("raw_gma", raw_gma),
    boolean!("lenc", lenc),
    KeySpec { name: "special_effect", kind: KeyKind::Choice(&SPECIAL_EFFECT) },
    KeySpec { name: "ssid", kind: KeyKind::Deprecated },
    KeySpec { name: "password", kind: KeyKind::Deprecated },
    KeySpec { name: "ntp_server", kind: KeyKind::Deprecated },
];
