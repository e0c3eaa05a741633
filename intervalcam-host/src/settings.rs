//! Settings file edits on a host card directory

use std::path::Path;

use anyhow::{Context, Result};
use intervalcam_core::constants::CONFIG_PATH;
use intervalcam_core::{ConfigStore, LoadError};

use crate::fs::FsStorage;

/// Change one setting and save the file
///
/// A file the device would reject is still edited: its valid lines are
/// kept, the rejected ones fall back to defaults on save.
pub fn update(card: &Path, key: &str, value: &str) -> Result<ConfigStore> {
    let mut storage =
        FsStorage::mount(card).with_context(|| format!("mounting {}", card.display()))?;

    let mut store = ConfigStore::new();
    match store.load(&mut storage, CONFIG_PATH) {
        Ok(_) => {}
        Err(LoadError::Invalid { rejected, malformed }) => log::warn!(
            "Settings file has {} rejected value(s) and {} malformed line(s); saving drops them",
            rejected,
            malformed
        ),
        Err(err) => return Err(anyhow::Error::new(err).context("reading settings")),
    }

    store.set(key, value).with_context(|| format!("setting {}", key))?;
    store.save(&mut storage, CONFIG_PATH).context("saving settings")?;
    Ok(store)
}
