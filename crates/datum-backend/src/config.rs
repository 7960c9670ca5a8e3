use serde::{Deserialize, Serialize};

/// Tuning for [`Backend`](crate::Backend) writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Compare-and-swap attempts per write before giving up with
    /// [`BackendError::WriteConflict`](crate::BackendError::WriteConflict).
    /// Writers within one backend never conflict with each other; only a
    /// second process writing the same blob uses up attempts.
    pub max_cas_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { max_cas_retries: 64 }
    }
}
