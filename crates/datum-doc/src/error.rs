use thiserror::Error;

/// Errors from path-addressed document writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocError {
    /// A path component names an existing value that is not a document.
    #[error("{0} is not a map")]
    NotAMap(String),

    /// Whole-document replacement is not expressible as a path write.
    #[error("cannot write to the document root")]
    RootWrite,
}

/// Convenience alias for document operations.
pub type DocResult<T> = std::result::Result<T, DocError>;
