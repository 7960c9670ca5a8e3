use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use datum_types::{Document, Value};

use crate::error::{ServerError, ServerResult};
use crate::route::{Format, KEY_ID_HEADER};

const JSON: &str = "application/json";
const TOML: &str = "application/toml";
const TEXT: &str = "text/plain; charset=utf-8";
const OCTETS: &str = "application/octet-stream";

/// Render a stored value for a GET response.
///
/// Documents are JSON unless TOML was asked for. Scalars are bare text
/// unless JSON was asked for. Encrypted values are returned as their raw
/// ciphertext with the key id in a response header, or as
/// `{"keyid", "value"}` JSON.
pub fn render(value: &Value, format: Format) -> ServerResult<Response> {
    match (value, format) {
        (Value::Document(doc), Format::Toml) => {
            Ok(([(CONTENT_TYPE, TOML)], to_toml(doc)?).into_response())
        }
        (Value::Document(_), _) | (_, Format::Json) => {
            Ok(([(CONTENT_TYPE, JSON)], to_json(value)?).into_response())
        }
        (Value::Scalar(scalar), _) => {
            Ok(([(CONTENT_TYPE, TEXT)], format!("{scalar}\n")).into_response())
        }
        (Value::Encrypted(enc), _) => Ok((
            [(CONTENT_TYPE.as_str(), OCTETS), (KEY_ID_HEADER, enc.key_id.as_str())],
            enc.ciphertext.clone(),
        )
            .into_response()),
    }
}

fn to_json(value: &Value) -> ServerResult<String> {
    let mut out =
        serde_json::to_string(value).map_err(|e| ServerError::Internal(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn to_toml(doc: &Document) -> ServerResult<String> {
    toml::to_string(doc).map_err(|e| ServerError::Internal(format!("rendering TOML: {e}")))
}
