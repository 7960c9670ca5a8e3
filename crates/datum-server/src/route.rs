//! Mapping request paths onto `(token, space, key)` targets.
//!
//! Four shapes are accepted, tried in order:
//!
//! 1. `/~space/key/...` with the token in the `Config-Token` header
//! 2. `/token/~space/key/...` (any header token is ignored)
//! 3. `/key/...` with the token in the header, space `default`
//! 4. `/token/key/...`, space `default`
//!
//! Key segments are joined with `.` so `/t/db/host` addresses `db.host`.

use datum_types::{DEFAULT_SPACE, PATH_SEPARATOR};

use crate::error::{ServerError, ServerResult};

pub const TOKEN_HEADER: &str = "Config-Token";
pub const KEY_ID_HEADER: &str = "Config-Encryption-KeyID";

const SPACE_MARKER: char = '~';

/// Rendering or parsing format requested through a path suffix or header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Plain,
    Json,
    Toml,
}

impl Format {
    fn from_suffix(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// A parsed request address. `token` is as requested, before alias
/// resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub token: String,
    pub space: String,
    /// Dotted key path; empty addresses the whole document.
    pub key: String,
    /// Format named by a `.json`/`.toml` suffix, if any.
    pub suffix: Option<Format>,
}

impl Target {
    pub fn parse(path: &str, header_token: Option<&str>) -> ServerResult<Self> {
        let header_token = header_token.filter(|t| !t.is_empty());
        let path = path.strip_prefix('/').unwrap_or(path);
        let (first, rest) = match path.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };

        let (token, space, key) = if let Some(space) = first.strip_prefix(SPACE_MARKER) {
            let token = header_token.ok_or(ServerError::MissingToken)?;
            (token, space, rest.unwrap_or(""))
        } else if let Some((space, key)) = rest.and_then(split_space) {
            (first, space, key)
        } else if let Some(token) = header_token {
            (token, "", path)
        } else {
            (first, "", rest.unwrap_or(""))
        };

        if token.is_empty() {
            return Err(ServerError::MissingToken);
        }

        let mut space = space.to_string();
        let mut key = key.trim_end_matches('/').to_string();
        // The suffix sits on the key, or on the space when no key is given.
        let suffix = if key.is_empty() {
            take_suffix(&mut space)
        } else {
            take_suffix(&mut key)
        };
        if space.is_empty() {
            space = DEFAULT_SPACE.to_string();
        }

        Ok(Self {
            token: token.to_string(),
            space,
            key: key.replace('/', &PATH_SEPARATOR.to_string()),
            suffix,
        })
    }
}

fn split_space(rest: &str) -> Option<(&str, &str)> {
    let (segment, key) = rest.split_once('/').unwrap_or((rest, ""));
    segment.strip_prefix(SPACE_MARKER).map(|space| (space, key))
}

fn take_suffix(name: &mut String) -> Option<Format> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || stem.ends_with('/') {
        return None;
    }
    let format = Format::from_suffix(ext)?;
    let stem_len = stem.len();
    name.truncate(stem_len);
    Some(format)
}
