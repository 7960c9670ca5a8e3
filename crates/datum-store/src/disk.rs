use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// Filesystem blob store with one directory per token and one file per
/// space: `<root>/<token>/<space>`.
///
/// Writes land in a temporary file inside the token directory and are renamed
/// into place, so readers never observe a half-written blob. Writes and
/// compare-and-swaps are serialised by a store-wide mutex; one process should
/// own a data directory.
#[derive(Debug)]
pub struct DiskBlobStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, token: &str, space: &str) -> StoreResult<PathBuf> {
        validate_name("token", token)?;
        validate_name("space", space)?;
        Ok(self.root.join(token).join(space))
    }

    fn read_blob(path: &Path) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_blob(path: &Path, data: &[u8]) -> StoreResult<()> {
        let dir = path.parent().ok_or_else(|| {
            StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "blob path has no parent directory",
            ))
        })?;
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Reject names that would escape or alias the directory layout.
fn validate_name(kind: &'static str, name: &str) -> StoreResult<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

impl BlobStore for DiskBlobStore {
    fn get(&self, token: &str, space: &str) -> StoreResult<Option<Vec<u8>>> {
        Self::read_blob(&self.blob_path(token, space)?)
    }

    fn set(&self, token: &str, space: &str, data: &[u8]) -> StoreResult<()> {
        let path = self.blob_path(token, space)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        Self::write_blob(&path, data)?;
        debug!(token, space, bytes = data.len(), "blob written");
        Ok(())
    }

    fn compare_and_swap(
        &self,
        token: &str,
        space: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> StoreResult<bool> {
        let path = self.blob_path(token, space)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let current = Self::read_blob(&path)?;
        if current.as_deref() != expected {
            debug!(token, space, "compare-and-swap lost");
            return Ok(false);
        }
        Self::write_blob(&path, new)?;
        debug!(token, space, bytes = new.len(), "blob swapped");
        Ok(true)
    }
}
