//! Binary codec for datum documents.
//!
//! Documents are stored as MessagePack maps. Scalars and nested documents use
//! MessagePack's native types; [`EncryptedValue`](datum_types::EncryptedValue)s
//! use a dedicated extension type ([`ENCRYPTED_EXT_TYPE`]) whose payload is
//! the key id, a newline, then the raw ciphertext.
//!
//! An empty blob decodes to an empty document.

pub mod codec;
pub mod error;
pub mod ext;

pub use codec::MsgpackCodec;
pub use error::{CodecError, CodecResult};
pub use ext::ENCRYPTED_EXT_TYPE;
