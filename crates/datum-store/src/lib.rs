//! Blob persistence for datum.
//!
//! The store holds exactly one opaque blob per (token, space) pair and never
//! interprets it. Documents are read-modify-written on top of it, so every
//! backend offers an atomic [`BlobStore::compare_and_swap`].
//!
//! # Storage Backends
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`DiskBlobStore`] -- directory-per-tenant files under a root directory
//!
//! # Design Rules
//!
//! 1. Absent blobs (`None`) are distinct from empty blobs (`Some(vec![])`).
//! 2. A compare-and-swap is atomic with respect to every other write to the
//!    same store instance.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod memory;
pub mod traits;

pub use disk::DiskBlobStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
