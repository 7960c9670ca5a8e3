use datum_types::{Document, Scalar, Value};
use rmpv::Value as Mp;

use crate::error::{CodecError, CodecResult};
use crate::ext::{decode_encrypted, encode_encrypted, ENCRYPTED_EXT_TYPE};

/// Codec between [`Document`]s and their stored MessagePack form.
pub struct MsgpackCodec;

impl MsgpackCodec {
    /// Encode a document as a MessagePack map.
    ///
    /// Output is deterministic: document keys iterate in sorted order.
    pub fn encode(doc: &Document) -> CodecResult<Vec<u8>> {
        let tree = document_to_mp(doc)?;
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &tree)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decode a stored blob. An empty blob is an empty document.
    pub fn decode(bytes: &[u8]) -> CodecResult<Document> {
        if bytes.is_empty() {
            return Ok(Document::new());
        }
        let mut rd = bytes;
        let tree = rmpv::decode::read_value(&mut rd)
            .map_err(|e| CodecError::CorruptEncoding(e.to_string()))?;
        if !rd.is_empty() {
            return Err(CodecError::CorruptEncoding(format!(
                "{} trailing bytes after document",
                rd.len()
            )));
        }
        match tree {
            Mp::Map(entries) => document_from_mp(entries),
            other => Err(CodecError::CorruptEncoding(format!(
                "top level is {}, expected a map",
                mp_kind(&other)
            ))),
        }
    }

    /// Decode a blob that may be absent from storage.
    pub fn decode_stored(bytes: Option<&[u8]>) -> CodecResult<Document> {
        bytes.map_or_else(|| Ok(Document::new()), Self::decode)
    }
}

fn document_to_mp(doc: &Document) -> CodecResult<Mp> {
    let entries = doc
        .iter()
        .map(|(k, v)| Ok((Mp::from(k.as_str()), value_to_mp(v)?)))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Mp::Map(entries))
}

fn value_to_mp(value: &Value) -> CodecResult<Mp> {
    Ok(match value {
        Value::Scalar(Scalar::String(s)) => Mp::from(s.as_str()),
        Value::Scalar(Scalar::Integer(i)) => Mp::from(*i),
        Value::Scalar(Scalar::Unsigned(u)) => Mp::from(*u),
        Value::Scalar(Scalar::Float(x)) => Mp::F64(*x),
        Value::Scalar(Scalar::Boolean(b)) => Mp::Boolean(*b),
        Value::Document(doc) => document_to_mp(doc)?,
        Value::Encrypted(enc) => Mp::Ext(ENCRYPTED_EXT_TYPE, encode_encrypted(enc)?),
    })
}

fn document_from_mp(entries: Vec<(Mp, Mp)>) -> CodecResult<Document> {
    let mut doc = Document::new();
    for (key, value) in entries {
        let key = match key {
            Mp::String(s) => s.into_str().ok_or_else(|| {
                CodecError::CorruptEncoding("map key is not valid utf-8".into())
            })?,
            other => {
                return Err(CodecError::CorruptEncoding(format!(
                    "map key is {}, expected a string",
                    mp_kind(&other)
                )))
            }
        };
        // Nil is absence; it never round-trips as a stored value.
        if let Some(value) = value_from_mp(value)? {
            doc.insert(key, value);
        }
    }
    Ok(doc)
}

fn value_from_mp(value: Mp) -> CodecResult<Option<Value>> {
    let value = match value {
        Mp::Nil => return Ok(None),
        Mp::Boolean(b) => Value::Scalar(Scalar::Boolean(b)),
        Mp::Integer(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Value::Scalar(Scalar::Integer(i)),
            (None, Some(u)) => Value::Scalar(Scalar::Unsigned(u)),
            (None, None) => {
                return Err(CodecError::CorruptEncoding("integer out of range".into()))
            }
        },
        Mp::F32(x) => Value::Scalar(Scalar::Float(f64::from(x))),
        Mp::F64(x) => Value::Scalar(Scalar::Float(x)),
        Mp::String(s) => Value::Scalar(Scalar::String(s.into_str().ok_or_else(|| {
            CodecError::CorruptEncoding("string value is not valid utf-8".into())
        })?)),
        Mp::Map(entries) => Value::Document(document_from_mp(entries)?),
        Mp::Ext(tag, payload) if tag == ENCRYPTED_EXT_TYPE => {
            Value::Encrypted(decode_encrypted(&payload)?)
        }
        other => {
            return Err(CodecError::CorruptEncoding(format!(
                "unsupported {} value",
                mp_kind(&other)
            )))
        }
    };
    Ok(Some(value))
}

fn mp_kind(value: &Mp) -> String {
    match value {
        Mp::Nil => "nil".into(),
        Mp::Boolean(_) => "boolean".into(),
        Mp::Integer(_) => "integer".into(),
        Mp::F32(_) | Mp::F64(_) => "float".into(),
        Mp::String(_) => "string".into(),
        Mp::Binary(_) => "binary".into(),
        Mp::Array(_) => "array".into(),
        Mp::Map(_) => "map".into(),
        Mp::Ext(tag, _) => format!("extension type {tag:#04x}"),
    }
}
