use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{SlotStorage, StorageError, validate_slot};

/// File-backed slot storage: one `<slot>.json` file per slot under `root`.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so readers see either the old blob or the new one.
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    root: PathBuf,
}

impl FileSlotStorage {
    /// Use `root` as the storage directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_synced(path: &Path, blob: &str) -> Result<(), StorageError> {
    let mut file = fs::File::create(path).map_err(io_err(path))?;
    file.write_all(blob.as_bytes()).map_err(io_err(path))?;
    file.sync_all().map_err(io_err(path))
}

impl SlotStorage for FileSlotStorage {
    fn load(&self, slot: &str) -> Result<Option<String>, StorageError> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_err(&path)(err)),
        }
    }

    fn save(&self, slot: &str, blob: &str) -> Result<(), StorageError> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        let tmp = self.root.join(format!(".{slot}.json.tmp"));

        let written = write_synced(&tmp, blob).and_then(|()| fs::rename(&tmp, &path).map_err(io_err(&path)));
        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary slot file");
                }
            }
            return Err(err);
        }

        tracing::debug!(path = %path.display(), bytes = blob.len(), "slot written");
        Ok(())
    }
}
