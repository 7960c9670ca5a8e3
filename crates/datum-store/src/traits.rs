use std::sync::Arc;

use crate::error::StoreResult;

/// Byte store keyed by (token, space).
///
/// All implementations must satisfy these invariants:
/// - `get` distinguishes an absent blob (`None`) from an empty one.
/// - `compare_and_swap` is atomic: no other write to the same key can land
///   between its comparison and its write.
/// - The store never interprets blob contents.
pub trait BlobStore: Send + Sync {
    /// Read the blob for `(token, space)`.
    ///
    /// Returns `Ok(None)` if nothing has been stored.
    fn get(&self, token: &str, space: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Unconditionally replace the blob for `(token, space)`.
    fn set(&self, token: &str, space: &str, data: &[u8]) -> StoreResult<()>;

    /// Replace the blob with `new` only if it currently equals `expected`
    /// (`None` meaning currently absent).
    ///
    /// Returns `Ok(true)` if the write happened, `Ok(false)` if the stored
    /// blob had changed.
    fn compare_and_swap(
        &self,
        token: &str,
        space: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> StoreResult<bool>;
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn get(&self, token: &str, space: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(token, space)
    }

    fn set(&self, token: &str, space: &str, data: &[u8]) -> StoreResult<()> {
        (**self).set(token, space, data)
    }

    fn compare_and_swap(
        &self,
        token: &str,
        space: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> StoreResult<bool> {
        (**self).compare_and_swap(token, space, expected, new)
    }
}
