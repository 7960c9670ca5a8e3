use datum_codec::CodecError;
use datum_doc::DocError;
use datum_store::StoreError;
use thiserror::Error;

/// Errors surfaced by [`Backend`](crate::Backend) and
/// [`TokenResolver`](crate::TokenResolver). None are retried internally
/// except compare-and-swap conflicts.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A stored blob does not decode, or a value cannot be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A path write descends through a non-document value.
    #[error("document error: {0}")]
    Document(#[from] DocError),

    /// An alias lookup found no mapping, or a mapping that is not a string.
    #[error("corrupt alias mapping for {token}")]
    CorruptAliasMapping { token: String },

    /// An alias may only point at a canonical, non-reserved token.
    #[error("invalid alias target: {0}")]
    InvalidAliasTarget(String),

    /// The persistence layer failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("write conflict on {token}/{space} after {attempts} attempts")]
    WriteConflict {
        token: String,
        space: String,
        attempts: u32,
    },
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
