//! Path-addressed mutation of datum documents.
//!
//! - [`set_path`] writes a value at a dotted path, creating intermediate
//!   documents on the way down. Writing `None` deletes the leaf and prunes
//!   every document on the path that the delete left empty.
//! - [`get_path`] reads without creating anything and treats missing or
//!   non-document ancestors as "not found".

pub mod error;
pub mod mutate;

pub use error::{DocError, DocResult};
pub use mutate::{find_or_create_sub, get_path, remove_path, set_path};
