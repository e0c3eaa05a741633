//! Activation loop
//!
//! On the device every activation ends in a timed suspend and the next one
//! starts from cold init. The simulator reproduces that: each activation
//! gets a fresh orchestrator, board and sensor; only the card directory,
//! the retained-memory file and the clock carry over.

use anyhow::{bail, Result};
use intervalcam_core::{Duration, Orchestrator, State, WakeCause};

use crate::board::{HostBoard, HostBoardConfig, HostClock};
use crate::camera::SyntheticCamera;

/// Outcome of one activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub wake: WakeCause,
    pub state: State,
    pub session: Option<u16>,
    pub captured: u32,
    pub skipped: u32,
    pub suspend: Option<Duration>,
}

pub struct Simulator {
    board: HostBoardConfig,
    clock: HostClock,
}

impl Simulator {
    pub fn new(board: HostBoardConfig, clock: HostClock) -> Self {
        Self { board, clock }
    }

    pub fn clock(&self) -> &HostClock {
        &self.clock
    }

    /// Boot once and run until the activation ends
    pub fn activate(&mut self, wake: WakeCause) -> Activation {
        let board = HostBoard::new(self.board.clone(), self.clock.clone(), wake);
        let mut orchestrator = Orchestrator::new(board, SyntheticCamera::new());
        let state = orchestrator.run();

        Activation {
            wake,
            state,
            session: orchestrator.session().map(|s| s.number),
            captured: orchestrator.stats().captured,
            skipped: orchestrator.stats().skipped,
            suspend: orchestrator.board().suspend_requested(),
        }
    }

    /// Run up to `count` activations, sleeping through each suspend
    ///
    /// Stops early in provisioning mode; a halt is an error.
    pub fn run(&mut self, count: usize, first_wake: WakeCause) -> Result<Vec<Activation>> {
        let mut activations = Vec::with_capacity(count);
        let mut wake = first_wake;

        for _ in 0..count {
            let activation = self.activate(wake);
            log::info!(
                "Activation ended in {:?} (session {:?}, {} captured)",
                activation.state,
                activation.session,
                activation.captured
            );

            match activation.state {
                State::Suspended => {
                    if let Some(duration) = activation.suspend {
                        self.clock.wait(duration);
                    }
                    wake = WakeCause::Timer;
                    activations.push(activation);
                }
                State::ProvisioningMode(reason) => {
                    log::warn!("Provisioning mode ({:?}); stopping", reason);
                    activations.push(activation);
                    break;
                }
                State::Halted(fault) => bail!("device halted: {}", fault),
                other => bail!("activation ended in unexpected state {:?}", other),
            }
        }
        Ok(activations)
    }
}
