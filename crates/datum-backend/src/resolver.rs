use datum_types::{KeyPath, Scalar, TokenForm, Value, ONETIME_SPACE, RESERVED_TENANT, VIEWS_SPACE};
use tracing::debug;

use crate::backend::Backend;
use crate::error::{BackendError, BackendResult};

/// Maps view and onetime alias tokens onto the canonical token they stand for.
///
/// Canonical tokens pass through untouched. View aliases are read and kept;
/// onetime aliases are removed by the same atomic write that reads them,
/// so a onetime alias resolves successfully at most once, even when several
/// requests race on it. Consumption happens whether or not the caller's
/// subsequent operation succeeds.
pub struct TokenResolver<'a> {
    backend: &'a Backend,
}

impl<'a> TokenResolver<'a> {
    pub fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    pub fn resolve(&self, token: &str) -> BackendResult<String> {
        match TokenForm::classify(token) {
            TokenForm::Canonical => Ok(token.to_string()),
            TokenForm::View => self.resolve_view(token),
            TokenForm::Onetime => self.consume_onetime(token),
        }
    }

    fn resolve_view(&self, token: &str) -> BackendResult<String> {
        let mapped =
            self.backend
                .get_at(RESERVED_TENANT, VIEWS_SPACE, &KeyPath::single(token))?;
        debug!(form = "view", space = VIEWS_SPACE, found = mapped.is_some(), "resolving alias");
        canonical_target(token, mapped)
    }

    fn consume_onetime(&self, token: &str) -> BackendResult<String> {
        let target = self
            .backend
            .take_entry(RESERVED_TENANT, ONETIME_SPACE, token, |mapped| {
                canonical_target(token, mapped.cloned())
            });
        debug!(
            form = "onetime",
            space = ONETIME_SPACE,
            consumed = target.is_ok(),
            "resolving alias"
        );
        target
    }
}

fn canonical_target(token: &str, mapped: Option<Value>) -> BackendResult<String> {
    match mapped {
        Some(Value::Scalar(Scalar::String(target))) => Ok(target),
        _ => Err(BackendError::CorruptAliasMapping {
            token: token.to_string(),
        }),
    }
}
