//! Synthetic image sensor
//!
//! Produces small JPEG-shaped frames so a simulated run leaves files that
//! image tools recognize. The frame carries everything after the SOI
//! marker; the header supplies SOI plus an EXIF block with the orientation,
//! the way the sensor driver on the board splits them.

use intervalcam_core::config::{FrameSize, Orientation};
use intervalcam_core::{Camera, CaptureError, Settings};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const APP1: [u8; 2] = [0xFF, 0xE1];
const COM: [u8; 2] = [0xFF, 0xFE];

const TAG_ORIENTATION: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;

#[derive(Debug, Default)]
pub struct SyntheticCamera {
    frame_size: Option<FrameSize>,
    quality: u8,
    frames: u32,
    /// Fail `init`, as a missing sensor would
    pub fail_init: bool,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames produced so far
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl Camera for SyntheticCamera {
    type Frame = Vec<u8>;

    fn init(&mut self, settings: &Settings) -> Result<(), CaptureError> {
        if self.fail_init {
            return Err(CaptureError::SensorInit);
        }
        let (width, height) = settings.frame_size().dimensions();
        log::info!("Synthetic sensor {}x{}, quality {}", width, height, settings.quality());
        self.frame_size = Some(settings.frame_size());
        self.quality = settings.quality();
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        let size = self.frame_size.ok_or(CaptureError::CaptureFailed)?;
        self.frames += 1;
        let (width, height) = size.dimensions();
        let comment = format!(
            "intervalcam synthetic frame {} {}x{} q{}",
            self.frames, width, height, self.quality
        );

        let mut frame = Vec::with_capacity(comment.len() + 6);
        frame.extend_from_slice(&COM);
        frame.extend_from_slice(&segment_len(comment.len()));
        frame.extend_from_slice(comment.as_bytes());
        frame.extend_from_slice(&EOI);
        Ok(frame)
    }

    fn frame_header_bytes(&mut self, _frame: &Vec<u8>, settings: &Settings) -> Vec<u8> {
        let mut header = Vec::with_capacity(38);
        header.extend_from_slice(&SOI);
        header.extend_from_slice(&exif_segment(settings.orientation()));
        header
    }
}

/// Big-endian segment length field for a payload of `len` bytes
fn segment_len(len: usize) -> [u8; 2] {
    ((len + 2) as u16).to_be_bytes()
}

/// APP1 segment holding a one-entry IFD0 with the orientation tag
fn exif_segment(orientation: Orientation) -> Vec<u8> {
    let mut tiff = Vec::with_capacity(26);
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&TAG_ORIENTATION.to_le_bytes());
    tiff.extend_from_slice(&TYPE_SHORT.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&(orientation.exif_code() as u16).to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut segment = Vec::with_capacity(tiff.len() + 10);
    segment.extend_from_slice(&APP1);
    segment.extend_from_slice(&segment_len(tiff.len() + 6));
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);
    segment
}
