//! Enumerated setting values and their accepted spellings

/// A setting with a fixed set of values and case-insensitive aliases
pub trait Choice: Copy + PartialEq + 'static {
    /// Every accepted spelling and the value it selects
    const ALIASES: &'static [(&'static str, Self)];

    /// Spelling used on save and in snapshots; always one of `ALIASES`
    fn name(self) -> &'static str;

    /// Exact case-insensitive match against `ALIASES`
    fn parse(value: &str) -> Option<Self> {
        Self::ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(value))
            .map(|&(_, choice)| choice)
    }
}

/// Sensor output resolution
///
/// Discriminants follow the camera driver's frame size table so the value
/// can be handed to the driver as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameSize {
    /// 160x120
    Qqvga = 1,
    /// 176x144
    Qcif = 2,
    /// 240x176
    Hqvga = 3,
    /// 320x240
    Qvga = 5,
    /// 400x296
    Cif = 6,
    /// 640x480
    Vga = 8,
    /// 800x600
    Svga = 9,
    /// 1024x768
    Xga = 10,
    /// 1280x1024
    Sxga = 12,
    /// 1600x1200
    Uxga = 13,
    /// 2048x1536, OV3660 only
    Qxga = 17,
}

impl FrameSize {
    /// Width and height in pixels
    pub const fn dimensions(self) -> (u16, u16) {
        match self {
            Self::Qqvga => (160, 120),
            Self::Qcif => (176, 144),
            Self::Hqvga => (240, 176),
            Self::Qvga => (320, 240),
            Self::Cif => (400, 296),
            Self::Vga => (640, 480),
            Self::Svga => (800, 600),
            Self::Xga => (1024, 768),
            Self::Sxga => (1280, 1024),
            Self::Uxga => (1600, 1200),
            Self::Qxga => (2048, 1536),
        }
    }

    /// Index into the camera driver's frame size table
    pub const fn driver_index(self) -> u8 {
        self as u8
    }
}

impl Choice for FrameSize {
    const ALIASES: &'static [(&'static str, Self)] = &[
        ("QQVGA", Self::Qqvga),
        ("160x120", Self::Qqvga),
        ("QCIF", Self::Qcif),
        ("176x144", Self::Qcif),
        ("HQVGA", Self::Hqvga),
        ("240x176", Self::Hqvga),
        ("QVGA", Self::Qvga),
        ("320x240", Self::Qvga),
        ("CIF", Self::Cif),
        ("400x296", Self::Cif),
        ("VGA", Self::Vga),
        ("640x480", Self::Vga),
        ("SVGA", Self::Svga),
        ("800x600", Self::Svga),
        ("XGA", Self::Xga),
        ("1024x768", Self::Xga),
        ("SXGA", Self::Sxga),
        ("1280x1024", Self::Sxga),
        ("UXGA", Self::Uxga),
        ("1600x1200", Self::Uxga),
        ("QXGA", Self::Qxga),
        ("2048x1536", Self::Qxga),
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Qqvga => "160x120",
            Self::Qcif => "176x144",
            Self::Hqvga => "240x176",
            Self::Qvga => "320x240",
            Self::Cif => "400x296",
            Self::Vga => "640x480",
            Self::Svga => "800x600",
            Self::Xga => "1024x768",
            Self::Sxga => "1280x1024",
            Self::Uxga => "1600x1200",
            Self::Qxga => "2048x1536",
        }
    }
}

/// White balance preset, used when automatic white balance is off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WbMode {
    /// Automatic
    Auto = 0,
    /// Daylight
    Sunny = 1,
    /// Overcast
    Cloudy = 2,
    /// Fluorescent
    Office = 3,
    /// Incandescent
    Home = 4,
}

impl Choice for WbMode {
    const ALIASES: &'static [(&'static str, Self)] = &[
        ("auto", Self::Auto),
        ("sunny", Self::Sunny),
        ("cloudy", Self::Cloudy),
        ("office", Self::Office),
        ("home", Self::Home),
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Office => "office",
            Self::Home => "home",
        }
    }
}

/// In-sensor colour effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpecialEffect {
    /// No effect
    None = 0,
    /// Inverted colours
    Negative = 1,
    /// Monochrome
    Grayscale = 2,
    /// Red tint
    RedTint = 3,
    /// Green tint
    GreenTint = 4,
    /// Blue tint
    BlueTint = 5,
    /// Sepia
    Sepia = 6,
}

impl Choice for SpecialEffect {
    const ALIASES: &'static [(&'static str, Self)] = &[
        ("none", Self::None),
        ("negative", Self::Negative),
        ("grayscale", Self::Grayscale),
        ("red tint", Self::RedTint),
        ("green tint", Self::GreenTint),
        ("blue tint", Self::BlueTint),
        ("sepia", Self::Sepia),
    ];

    fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Negative => "negative",
            Self::Grayscale => "grayscale",
            Self::RedTint => "red tint",
            Self::GreenTint => "green tint",
            Self::BlueTint => "blue tint",
            Self::Sepia => "sepia",
        }
    }
}

/// Image orientation
///
/// Stored as the EXIF orientation code the header encoder writes, exposed
/// to users as a clockwise rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// Upright
    Normal = 1,
    /// 180 degrees
    Rotate180 = 3,
    /// 90 degrees clockwise
    Rotate90 = 6,
    /// 270 degrees clockwise (90 counter-clockwise)
    Rotate270 = 8,
}

impl Orientation {
    /// Map a rotation in degrees; negative values are counter-clockwise
    pub const fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::Normal),
            90 | -270 => Some(Self::Rotate90),
            180 | -180 => Some(Self::Rotate180),
            270 | -90 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Clockwise rotation in degrees
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Normal => 0,
            Self::Rotate90 => 90,
            Self::Rotate180 => 180,
            Self::Rotate270 => 270,
        }
    }

    /// EXIF orientation tag value
    pub const fn exif_code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_accepts_both_spellings() {
        assert_eq!(FrameSize::parse("svga"), Some(FrameSize::Svga));
        assert_eq!(FrameSize::parse("800X600"), Some(FrameSize::Svga));
        assert_eq!(FrameSize::parse("96x96"), None);
        assert_eq!(FrameSize::parse(" VGA"), None);
    }

    #[test]
    fn canonical_names_parse_back() {
        for &(_, size) in FrameSize::ALIASES {
            assert_eq!(FrameSize::parse(size.name()), Some(size));
        }
        for &(_, mode) in WbMode::ALIASES {
            assert_eq!(WbMode::parse(mode.name()), Some(mode));
        }
        for &(_, effect) in SpecialEffect::ALIASES {
            assert_eq!(SpecialEffect::parse(effect.name()), Some(effect));
        }
    }

    #[test]
    fn multi_word_effects() {
        assert_eq!(SpecialEffect::parse("Red Tint"), Some(SpecialEffect::RedTint));
        assert_eq!(SpecialEffect::parse("red  tint"), None);
    }

    #[test]
    fn rotation_codes() {
        assert_eq!(Orientation::from_degrees(-90), Some(Orientation::Rotate270));
        assert_eq!(Orientation::from_degrees(-270), Some(Orientation::Rotate90));
        assert_eq!(Orientation::from_degrees(45), None);
        assert_eq!(Orientation::Rotate90.exif_code(), 6);
        assert_eq!(Orientation::Rotate180.degrees(), 180);
    }

    #[test]
    fn driver_indices() {
        assert_eq!(FrameSize::Uxga.driver_index(), 13);
        assert_eq!(FrameSize::Uxga.dimensions(), (1600, 1200));
        assert_eq!(FrameSize::Qxga.driver_index(), 17);
    }
}
