use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use datum_codec::MsgpackCodec;
use datum_doc::{get_path, set_path};
use datum_store::BlobStore;
use datum_types::{
    is_reserved_tenant, Document, KeyPath, TokenForm, Value, ONETIME_PREFIX, ONETIME_SPACE,
    RESERVED_TENANT, VIEWS_SPACE, VIEW_PREFIX,
};
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::resolver::TokenResolver;
use crate::tokens::{TokenGenerator, UuidTokenGenerator};

/// Path-addressed document store over a [`BlobStore`].
///
/// Holds no document state between calls: every operation loads its document
/// fresh from the store.
pub struct Backend {
    store: Arc<dyn BlobStore>,
    tokens: Arc<dyn TokenGenerator>,
    config: BackendConfig,
    write_locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl Backend {
    /// Backend with default config and UUID token minting.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_config(store, BackendConfig::default())
    }

    pub fn with_config(store: Arc<dyn BlobStore>, config: BackendConfig) -> Self {
        Self {
            store,
            tokens: Arc::new(UuidTokenGenerator),
            config,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the token generator used by the `create_*` operations.
    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    // ---- Document operations ----

    /// Load and decode the document for `(token, space)`. Absent storage is an
    /// empty document.
    pub fn load(&self, token: &str, space: &str) -> BackendResult<Document> {
        let blob = self.store.get(token, space)?;
        Ok(MsgpackCodec::decode_stored(blob.as_deref())?)
    }

    /// Read the value at a dotted `path`. `""` returns the whole document.
    pub fn get(&self, token: &str, space: &str, path: &str) -> BackendResult<Option<Value>> {
        self.get_at(token, space, &KeyPath::parse(path))
    }

    pub fn get_at(&self, token: &str, space: &str, path: &KeyPath) -> BackendResult<Option<Value>> {
        let doc = self.load(token, space)?;
        debug!(token, space, path = %path, "get");
        Ok(get_path(&doc, path))
    }

    /// Write `value` at a dotted `path`, or delete it when `value` is `None`.
    pub fn set(
        &self,
        token: &str,
        space: &str,
        path: &str,
        value: Option<Value>,
    ) -> BackendResult<()> {
        self.set_at(token, space, &KeyPath::parse(path), value)
            .map(|_| ())
    }

    /// Path-typed [`set`](Self::set); returns the value previously at the leaf.
    pub fn set_at(
        &self,
        token: &str,
        space: &str,
        path: &KeyPath,
        value: Option<Value>,
    ) -> BackendResult<Option<Value>> {
        let kind = value.as_ref().map_or("delete", |v| v.kind());
        debug!(token, space, path = %path, kind, "set");
        self.update(token, space, |doc| Ok(set_path(doc, path, value.clone())?))
    }

    pub fn delete(&self, token: &str, space: &str, path: &str) -> BackendResult<()> {
        self.set(token, space, path, None)
    }

    /// Read-modify-write the document for `(token, space)`.
    ///
    /// Writers going through this backend are serialised per `(token, space)`
    /// for the whole cycle: `f` runs against a freshly loaded document and the
    /// result is stored with a compare-and-swap against the blob that was
    /// loaded. A failed swap means another process wrote the blob; the cycle
    /// is then retried, up to `max_cas_retries` times, so `f` may run more than
    /// once. If `f` fails, nothing is written. A cycle that leaves the stored
    /// bytes unchanged skips the write.
    pub fn update<R, F>(&self, token: &str, space: &str, mut f: F) -> BackendResult<R>
    where
        F: FnMut(&mut Document) -> BackendResult<R>,
    {
        let lock = self.write_lock(token, space);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let attempts = self.config.max_cas_retries.max(1);
        for attempt in 1..=attempts {
            let current = self.store.get(token, space)?;
            let mut doc = MsgpackCodec::decode_stored(current.as_deref())?;
            let result = f(&mut doc)?;

            let encoded = MsgpackCodec::encode(&doc)?;
            let unchanged = match current.as_deref() {
                Some(bytes) => bytes == encoded.as_slice(),
                None => doc.is_empty(),
            };
            if unchanged {
                return Ok(result);
            }
            if self
                .store
                .compare_and_swap(token, space, current.as_deref(), &encoded)?
            {
                return Ok(result);
            }
            debug!(token, space, attempt, "document changed underneath write, retrying");
        }
        Err(BackendError::WriteConflict {
            token: token.to_string(),
            space: space.to_string(),
            attempts,
        })
    }

    fn write_lock(&self, token: &str, space: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry((token.to_string(), space.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Atomically remove one top-level `key`.
    ///
    /// `accept` sees the current value (if any) first; the key is removed
    /// only when it returns `Ok`, and an `Err` leaves the document untouched.
    /// `key` is taken verbatim, not split on dots. Of any number of
    /// concurrent callers, at most one has its `accept` succeed on a given
    /// value.
    pub fn take_entry<T, F>(
        &self,
        token: &str,
        space: &str,
        key: &str,
        mut accept: F,
    ) -> BackendResult<T>
    where
        F: FnMut(Option<&Value>) -> BackendResult<T>,
    {
        self.update(token, space, |doc| {
            let taken = accept(doc.get(key))?;
            doc.remove(key);
            Ok(taken)
        })
    }

    // ---- Tokens and aliases ----

    /// Mint a fresh canonical token. Nothing is stored until it is written to.
    pub fn create_token(&self) -> String {
        self.tokens.new_token()
    }

    /// Register a single-use alias for `parent` and return it.
    pub fn create_onetime(&self, parent: &str) -> BackendResult<String> {
        self.create_alias(ONETIME_PREFIX, ONETIME_SPACE, parent)
    }

    /// Register a durable view alias for `parent` and return it.
    pub fn create_view(&self, parent: &str) -> BackendResult<String> {
        self.create_alias(VIEW_PREFIX, VIEWS_SPACE, parent)
    }

    fn create_alias(&self, prefix: &str, space: &str, parent: &str) -> BackendResult<String> {
        if parent.is_empty() || is_reserved_tenant(parent) || TokenForm::classify(parent).is_alias()
        {
            return Err(BackendError::InvalidAliasTarget(parent.to_string()));
        }
        let alias = format!("{prefix}{}", self.tokens.new_token());
        self.set_at(
            RESERVED_TENANT,
            space,
            &KeyPath::single(alias.as_str()),
            Some(Value::from(parent)),
        )?;
        info!(space, "alias registered");
        Ok(alias)
    }

    /// Resolver that maps alias tokens through this backend.
    pub fn resolver(&self) -> TokenResolver<'_> {
        TokenResolver::new(self)
    }

    /// Shorthand for `self.resolver().resolve(token)`.
    pub fn resolve(&self, token: &str) -> BackendResult<String> {
        self.resolver().resolve(token)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
