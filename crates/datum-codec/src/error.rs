/// Errors from encoding or decoding documents.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The bytes are not a well-formed document.
    #[error("corrupt encoding: {0}")]
    CorruptEncoding(String),

    /// An encrypted value's key id contains the payload delimiter and cannot
    /// be framed.
    #[error("encryption key id {0:?} contains a newline")]
    InvalidKeyId(String),

    /// The MessagePack writer failed.
    #[error("encode error: {0}")]
    Encode(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
