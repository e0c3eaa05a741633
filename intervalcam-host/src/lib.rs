//! Desktop collaborators for intervalcam
//!
//! Runs the capture cycle on a workstation: a directory stands in for the
//! card, a file for retained memory, and a synthetic sensor for the camera.
//! Used by the `intervalcam-sim` binary and for checking settings files
//! before they go onto a card.

pub mod board;
pub mod camera;
pub mod fs;
pub mod settings;
pub mod sim;

pub use board::{posix_tz_offset, HostBoard, HostBoardConfig, HostClock};
pub use camera::SyntheticCamera;
pub use fs::{FsFile, FsStorage};
pub use sim::{Activation, Simulator};
