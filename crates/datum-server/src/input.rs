use axum::http::HeaderValue;
use datum_types::{Document, EncryptedValue, Scalar, Value};

use crate::error::{ServerError, ServerResult};
use crate::route::Format;

/// Decode a PUT body into the value to store. `None` means delete.
///
/// A key id marks the body as ciphertext and takes precedence over any
/// format; otherwise JSON and TOML bodies are parsed and anything else is
/// stored as a UTF-8 string.
pub fn decode_body(
    body: &[u8],
    format: Format,
    key_id: Option<&str>,
) -> ServerResult<Option<Value>> {
    if let Some(key_id) = key_id {
        // The key id is echoed back as a response header on reads.
        if HeaderValue::from_str(key_id).is_err() {
            return Err(ServerError::BadRequest(format!(
                "key id {key_id:?} is not a valid header value"
            )));
        }
        return Ok(Some(Value::Encrypted(EncryptedValue::new(key_id, body))));
    }
    match format {
        Format::Json => {
            let json: serde_json::Value = serde_json::from_slice(body)
                .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))?;
            from_json(json)
        }
        Format::Toml => {
            let text = utf8(body)?;
            let table: toml::Table = toml::from_str(text)
                .map_err(|e| ServerError::BadRequest(format!("invalid TOML body: {e}")))?;
            Ok(Some(Value::Document(document_from_toml(table)?)))
        }
        Format::Plain => Ok(Some(Value::from(utf8(body)?))),
    }
}

fn utf8(body: &[u8]) -> ServerResult<&str> {
    std::str::from_utf8(body).map_err(|_| ServerError::BadRequest("body is not valid UTF-8".into()))
}

fn from_json(json: serde_json::Value) -> ServerResult<Option<Value>> {
    use serde_json::Value as Json;
    let value = match json {
        Json::Null => return Ok(None),
        Json::Bool(b) => Value::from(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let x = n
                    .as_f64()
                    .ok_or_else(|| ServerError::BadRequest(format!("unsupported number {n}")))?;
                Value::from(x)
            }
        }
        Json::String(s) => Value::from(s),
        Json::Array(_) => return Err(ServerError::BadRequest("arrays are not supported".into())),
        Json::Object(entries) => {
            let mut doc = Document::new();
            for (key, value) in entries {
                // Nulls inside an object are absent keys.
                if let Some(value) = from_json(value)? {
                    doc.insert(key, value);
                }
            }
            Value::Document(doc)
        }
    };
    Ok(Some(value))
}

fn document_from_toml(table: toml::Table) -> ServerResult<Document> {
    table
        .into_iter()
        .map(|(key, value)| from_toml(value).map(|value| (key, value)))
        .collect()
}

fn from_toml(value: toml::Value) -> ServerResult<Value> {
    use toml::Value as Toml;
    Ok(match value {
        Toml::String(s) => Value::from(s),
        Toml::Integer(i) => Value::from(i),
        Toml::Float(x) => Value::from(x),
        Toml::Boolean(b) => Value::from(b),
        Toml::Datetime(dt) => Value::Scalar(Scalar::String(dt.to_string())),
        Toml::Table(table) => Value::Document(document_from_toml(table)?),
        Toml::Array(_) => return Err(ServerError::BadRequest("arrays are not supported".into())),
    })
}
