use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

type BlobKey = (String, String);

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock`; a
/// compare-and-swap holds the write lock across its comparison.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobKey, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of (token, space) blobs currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.blobs.read().map_err(|_| StoreError::LockPoisoned)?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(token: &str, space: &str) -> BlobKey {
    (token.to_string(), space.to_string())
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, token: &str, space: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(&key(token, space)).cloned())
    }

    fn set(&self, token: &str, space: &str, data: &[u8]) -> StoreResult<()> {
        let mut map = self.blobs.write().map_err(|_| StoreError::LockPoisoned)?;
        map.insert(key(token, space), data.to_vec());
        Ok(())
    }

    fn compare_and_swap(
        &self,
        token: &str,
        space: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> StoreResult<bool> {
        let mut map = self.blobs.write().map_err(|_| StoreError::LockPoisoned)?;
        let k = key(token, space);
        if map.get(&k).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        map.insert(k, new.to_vec());
        Ok(true)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &count)
            .finish()
    }
}
