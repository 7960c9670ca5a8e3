use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Separator between path components.
pub const PATH_SEPARATOR: char = '.';

/// A location inside a [`Document`](crate::Document).
///
/// The empty path addresses the whole document. Otherwise the last component
/// is the leaf key and the preceding ones name the nested documents to
/// descend through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    components: Vec<String>,
}

impl KeyPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a dotted path. `""` parses to the root path; empty components
    /// between separators are kept as empty keys.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self {
            components: path.split(PATH_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// A single top-level key, taken verbatim even if it contains the
    /// separator.
    pub fn single(key: impl Into<String>) -> Self {
        Self {
            components: vec![key.into()],
        }
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Split into `(ancestors, leaf)`. `None` for the root path.
    pub fn split_leaf(&self) -> Option<(&[String], &str)> {
        let (leaf, ancestors) = self.components.split_last()?;
        Some((ancestors, leaf.as_str()))
    }
}

impl FromStr for KeyPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(c)?;
        }
        Ok(())
    }
}
