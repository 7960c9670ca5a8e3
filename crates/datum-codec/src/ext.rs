use datum_types::{EncryptedValue, KEY_ID_DELIMITER};

use crate::error::{CodecError, CodecResult};

/// MessagePack extension type tag for encrypted values.
pub const ENCRYPTED_EXT_TYPE: i8 = 0x47;

/// Frame an encrypted value as `key_id '\n' ciphertext`.
///
/// Fails if the key id contains the delimiter.
pub fn encode_encrypted(value: &EncryptedValue) -> CodecResult<Vec<u8>> {
    if !value.has_valid_key_id() {
        return Err(CodecError::InvalidKeyId(value.key_id.clone()));
    }
    let mut buf = Vec::with_capacity(value.key_id.len() + 1 + value.ciphertext.len());
    buf.extend_from_slice(value.key_id.as_bytes());
    buf.push(KEY_ID_DELIMITER);
    buf.extend_from_slice(&value.ciphertext);
    Ok(buf)
}

/// Split an extension payload on its first delimiter.
pub fn decode_encrypted(payload: &[u8]) -> CodecResult<EncryptedValue> {
    let split = payload
        .iter()
        .position(|&b| b == KEY_ID_DELIMITER)
        .ok_or_else(|| {
            CodecError::CorruptEncoding("encrypted value payload has no key id delimiter".into())
        })?;
    let key_id = std::str::from_utf8(&payload[..split]).map_err(|e| {
        CodecError::CorruptEncoding(format!("encrypted value key id is not utf-8: {e}"))
    })?;
    Ok(EncryptedValue::new(key_id, &payload[split + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_key_id_then_ciphertext() {
        let enc = EncryptedValue::new("a1b2c3", b"foo".to_vec());
        assert_eq!(encode_encrypted(&enc).unwrap(), b"a1b2c3\nfoo");
    }

    #[test]
    fn splits_on_first_delimiter_only() {
        let dec = decode_encrypted(b"k1\nline1\nline2").unwrap();
        assert_eq!(dec.key_id, "k1");
        assert_eq!(dec.ciphertext, b"line1\nline2");
    }

    #[test]
    fn empty_ciphertext() {
        let dec = decode_encrypted(b"k1\n").unwrap();
        assert_eq!(dec.key_id, "k1");
        assert!(dec.ciphertext.is_empty());
    }

    #[test]
    fn rejects_delimiter_in_key_id() {
        let enc = EncryptedValue::new("bad\nkey", b"x".to_vec());
        assert!(matches!(encode_encrypted(&enc), Err(CodecError::InvalidKeyId(_))));
    }

    #[test]
    fn rejects_missing_delimiter() {
        assert!(matches!(
            decode_encrypted(b"no-delimiter"),
            Err(CodecError::CorruptEncoding(_))
        ));
    }
}
