//! Card storage on a host directory
//!
//! Device paths under the mount point (`/sdcard/...`) map onto a directory
//! of the host filesystem, so a session written by the simulator looks
//! exactly like the card after a field run.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use intervalcam_core::constants::STORAGE_ROOT;
use intervalcam_core::{FileSink, Storage, StorageError, StorageResult};

/// Host directory standing in for the card
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    mount_point: &'static str,
}

impl FsStorage {
    /// Mount `root` at the default mount point; fails if it is not a directory
    pub fn mount(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            log::error!("Card directory {} not found", root.display());
            return Err(StorageError::MountFailed);
        }
        Ok(Self { root, mount_point: STORAGE_ROOT })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path of a device path, `None` if outside the mount point
    pub fn host_path(&self, device_path: &str) -> Option<PathBuf> {
        let rest = device_path.strip_prefix(self.mount_point)?;
        if rest.is_empty() {
            return Some(self.root.clone());
        }
        let rest = rest.strip_prefix('/')?;
        if rest.split('/').any(|part| part.is_empty() || part == "..") {
            return None;
        }
        Some(self.root.join(rest))
    }

    fn resolve(&self, device_path: &str, err: StorageError) -> StorageResult<PathBuf> {
        self.host_path(device_path).ok_or_else(|| {
            log::warn!("Path {} is outside {}", device_path, self.mount_point);
            err
        })
    }
}

/// Buffered file, synced on close
pub struct FsFile {
    writer: BufWriter<File>,
}

impl FileSink for FsFile {
    fn write_all(&mut self, data: &[u8]) -> StorageResult<()> {
        self.writer.write_all(data).map_err(|e| io_error(e, StorageError::WriteFailed))
    }

    fn close(self) -> StorageResult<()> {
        let file = self
            .writer
            .into_inner()
            .map_err(|e| io_error(e.into_error(), StorageError::CloseFailed))?;
        file.sync_all().map_err(|e| io_error(e, StorageError::CloseFailed))
    }
}

impl Storage for FsStorage {
    type File = FsFile;

    fn list_dir(&mut self, path: &str, visit: &mut dyn FnMut(&str)) -> StorageResult<()> {
        let dir = self.resolve(path, StorageError::ListFailed)?;
        let entries = fs::read_dir(&dir).map_err(|e| io_error(e, StorageError::ListFailed))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error(e, StorageError::ListFailed))?;
            if let Some(name) = entry.file_name().to_str() {
                visit(name);
            }
        }
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> StorageResult<()> {
        let dir = self.resolve(path, StorageError::CreateDirFailed)?;
        fs::create_dir(&dir).map_err(|e| io_error(e, StorageError::CreateDirFailed))
    }

    fn open_write(&mut self, path: &str) -> StorageResult<FsFile> {
        let file_path = self.resolve(path, StorageError::OpenFailed)?;
        let file = File::create(&file_path).map_err(|e| io_error(e, StorageError::OpenFailed))?;
        Ok(FsFile { writer: BufWriter::new(file) })
    }

    fn read_to_string(&mut self, path: &str) -> StorageResult<Option<String>> {
        let file_path = self.resolve(path, StorageError::ReadFailed)?;
        match fs::read_to_string(&file_path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e, StorageError::ReadFailed)),
        }
    }
}

fn io_error(err: io::Error, mapped: StorageError) -> StorageError {
    log::warn!("{}: {}", mapped, err);
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_device_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::mount(dir.path()).unwrap();

        assert_eq!(storage.host_path("/sdcard"), Some(dir.path().to_path_buf()));
        assert_eq!(
            storage.host_path("/sdcard/timelapse0001/a.jpg"),
            Some(dir.path().join("timelapse0001").join("a.jpg"))
        );
        assert_eq!(storage.host_path("/sdcardx/a"), None);
        assert_eq!(storage.host_path("/etc/passwd"), None);
        assert_eq!(storage.host_path("/sdcard/../etc"), None);
        assert_eq!(storage.host_path("/sdcard//a"), None);
    }

    #[test]
    fn missing_root_fails_to_mount() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(FsStorage::mount(missing).unwrap_err(), StorageError::MountFailed);
    }
}
