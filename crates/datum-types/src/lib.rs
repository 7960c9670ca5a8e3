//! Foundation types for the datum configuration store.
//!
//! Every other datum crate speaks in terms of these types:
//!
//! - [`Value`] -- the closed set of things a key can hold: a [`Scalar`], a
//!   nested [`Document`], or an opaque [`EncryptedValue`]
//! - [`Document`] -- a string-keyed tree, persisted as one blob per
//!   (token, space)
//! - [`KeyPath`] -- a dot-delimited address inside a document
//! - [`TokenForm`] -- canonical, view-alias, or onetime-alias tokens, plus the
//!   reserved namespace constants the aliases live under
//!
//! Absent values are modelled as `Option<Value>`; there is no null variant.

pub mod path;
pub mod token;
pub mod value;

pub use path::{KeyPath, PATH_SEPARATOR};
pub use token::{
    is_reserved_tenant, TokenForm, DEFAULT_SPACE, ONETIME_PREFIX, ONETIME_SPACE, RESERVED_TENANT, VIEWS_SPACE,
    VIEW_PREFIX,
};
pub use value::{Document, EncryptedValue, Scalar, Value, KEY_ID_DELIMITER};
