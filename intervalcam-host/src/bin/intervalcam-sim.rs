//! intervalcam-sim - run the capture cycle against a host directory
//!
//! Subcommands:
//! - `intervalcam-sim run <card>` - simulate activations, writing sessions to `<card>`
//! - `intervalcam-sim show <card>` - print the effective settings as JSON
//! - `intervalcam-sim check <card>` - validate the settings file
//! - `intervalcam-sim set <card> <key> <value>` - change one setting and save,
//!   also repairing a file `check` rejects

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use intervalcam_core::constants::CONFIG_PATH;
use intervalcam_core::time::millis;
use intervalcam_core::{ConfigStore, LoadError, WakeCause};
use intervalcam_host::{settings, FsStorage, HostBoardConfig, HostClock, Simulator};

#[derive(Parser)]
#[command(name = "intervalcam-sim")]
#[command(about = "Interval camera simulator and settings tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate activations
    Run {
        /// Directory standing in for the card
        card: PathBuf,

        /// File standing in for retained memory
        #[arg(long, default_value = "intervalcam.rtc")]
        retained: PathBuf,

        /// Number of activations
        #[arg(short = 'n', long, default_value = "3")]
        activations: usize,

        /// Wake cause of the first activation
        #[arg(long, value_enum, default_value = "power-on")]
        wake: Wake,

        /// Hold the provisioning trigger at boot
        #[arg(long)]
        provision: bool,

        /// Sleep for real instead of advancing a virtual clock
        #[arg(long)]
        realtime: bool,

        /// Poll delay while resident, milliseconds
        #[arg(long, default_value = "10")]
        poll_ms: u64,
    },

    /// Print the effective settings as JSON
    Show {
        /// Directory standing in for the card
        card: PathBuf,
    },

    /// Validate the settings file
    Check {
        /// Directory standing in for the card
        card: PathBuf,
    },

    /// Change one setting and save the file
    Set {
        /// Directory standing in for the card
        card: PathBuf,

        key: String,

        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Wake {
    PowerOn,
    Timer,
    Reset,
}

impl From<Wake> for WakeCause {
    fn from(wake: Wake) -> Self {
        match wake {
            Wake::PowerOn => WakeCause::PowerOn,
            Wake::Timer => WakeCause::Timer,
            Wake::Reset => WakeCause::Reset,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { card, retained, activations, wake, provision, realtime, poll_ms } => {
            let mut board = HostBoardConfig::new(card, retained);
            board.provisioning = provision;
            board.poll = millis(poll_ms);
            let clock = if realtime { HostClock::System } else { HostClock::virtual_from_system() };

            let mut simulator = Simulator::new(board, clock);
            for (i, activation) in simulator.run(activations, wake.into())?.iter().enumerate() {
                println!(
                    "#{} {:?}: {:?}, session {:?}, {} captured, {} skipped",
                    i + 1,
                    activation.wake,
                    activation.state,
                    activation.session,
                    activation.captured,
                    activation.skipped
                );
            }
        }

        Commands::Show { card } => {
            let store = load(&card)?;
            println!("{}", store.snapshot_json()?);
        }

        Commands::Check { card } => {
            let mut storage = mount(&card)?;
            let mut store = ConfigStore::new();
            match store.load(&mut storage, CONFIG_PATH) {
                Ok(report) if !report.found => println!("No settings file, defaults apply"),
                Ok(report) => println!(
                    "OK: {} lines, {} updated, {} unknown, {} deprecated",
                    report.lines, report.updated, report.unknown, report.deprecated
                ),
                Err(LoadError::Invalid { rejected, malformed }) => {
                    bail!("{} rejected value(s), {} malformed line(s)", rejected, malformed)
                }
                Err(err) => return Err(anyhow::Error::new(err).context("reading settings")),
            }
        }

        Commands::Set { card, key, value } => {
            let store = settings::update(&card, &key, &value)?;
            match store.get(&key) {
                Some(current) => println!("{} = {}", key, current),
                None => println!("'{}' is not a setting and was ignored", key),
            }
        }
    }

    Ok(())
}

fn mount(card: &Path) -> Result<FsStorage> {
    FsStorage::mount(card).with_context(|| format!("mounting {}", card.display()))
}

/// Settings from the card; the file must be valid
fn load(card: &Path) -> Result<ConfigStore> {
    let mut storage = mount(card)?;
    let mut store = ConfigStore::new();
    store.load(&mut storage, CONFIG_PATH).context("reading settings")?;
    Ok(store)
}
