//! Token forms and the reserved namespace that alias mappings live in.
//!
//! Aliases are ordinary entries in the reserved tenant [`RESERVED_TENANT`]:
//! `(_, views, v-xxx) = canonical` and `(_, onetime, o-xxx) = canonical`.

/// Tenant holding alias mappings.
pub const RESERVED_TENANT: &str = "_";
/// Space of durable view aliases inside the reserved tenant.
pub const VIEWS_SPACE: &str = "views";
/// Space of single-use aliases inside the reserved tenant.
pub const ONETIME_SPACE: &str = "onetime";
/// Space used when a request names none.
pub const DEFAULT_SPACE: &str = "default";

pub const VIEW_PREFIX: &str = "v-";
pub const ONETIME_PREFIX: &str = "o-";

/// Lexical form of a token, decided by prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenForm {
    Canonical,
    /// Resolves any number of times; never removed automatically.
    View,
    /// Resolves at most once; consumed by its first resolution.
    Onetime,
}

impl TokenForm {
    /// Classify a token. Tokens of two bytes or fewer are always canonical,
    /// so a bare `v-` or `o-` is a canonical token.
    pub fn classify(token: &str) -> Self {
        if token.len() <= 2 {
            Self::Canonical
        } else if token.starts_with(VIEW_PREFIX) {
            Self::View
        } else if token.starts_with(ONETIME_PREFIX) {
            Self::Onetime
        } else {
            Self::Canonical
        }
    }

    pub fn is_alias(self) -> bool {
        self != Self::Canonical
    }
}

/// Whether `token` addresses the tenant reserved for alias mappings.
pub fn is_reserved_tenant(token: &str) -> bool {
    token == RESERVED_TENANT
}
