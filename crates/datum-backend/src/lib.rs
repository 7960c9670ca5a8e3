//! Document backend for the datum configuration store.
//!
//! [`Backend`] composes the MessagePack codec, the path mutator and a
//! [`BlobStore`] into `get`/`set` over `(token, space, path)`. Every write is
//! a compare-and-swap read-modify-write of the whole document blob, retried
//! on conflict, so concurrent writers to one document never lose updates.
//!
//! [`TokenResolver`] maps view (`v-`) and onetime (`o-`) aliases onto
//! canonical tokens before a request touches its document. Onetime aliases
//! are consumed atomically by their first resolution.

pub mod backend;
pub mod config;
pub mod error;
pub mod resolver;
pub mod tokens;

pub use backend::Backend;
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use resolver::TokenResolver;
pub use tokens::{TokenGenerator, UuidTokenGenerator};

// Re-export the types callers need to build requests.
pub use datum_codec::CodecError;
pub use datum_doc::DocError;
pub use datum_store::{BlobStore, DiskBlobStore, InMemoryBlobStore, StoreError};
pub use datum_types::{Document, EncryptedValue, KeyPath, Scalar, TokenForm, Value, DEFAULT_SPACE};
