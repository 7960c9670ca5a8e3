use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use datum_backend::{Backend, BackendResult};
use datum_types::{is_reserved_tenant, Value};
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};
use crate::input::decode_body;
use crate::render::render;
use crate::route::{Format, Target, KEY_ID_HEADER, TOKEN_HEADER};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
}

/// Run a backend call on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> ServerResult<T>
where
    F: FnOnce(&Backend) -> BackendResult<T> + Send + 'static,
    T: Send + 'static,
{
    let backend = Arc::clone(&state.backend);
    tokio::task::spawn_blocking(move || f(&backend))
        .await
        .map_err(|e| ServerError::Internal(format!("backend task failed: {e}")))?
        .map_err(ServerError::from)
}

/// `POST /create`: mint a canonical token.
pub async fn create_token(State(state): State<AppState>) -> String {
    let token = state.backend.create_token();
    info!("token created");
    format!("{token}\n")
}

/// `POST /create/onetime/:parent`: register a single-use alias.
pub async fn create_onetime(
    State(state): State<AppState>,
    Path(parent): Path<String>,
) -> ServerResult<String> {
    let token = blocking(&state, move |backend| backend.create_onetime(&parent)).await?;
    Ok(format!("{token}\n"))
}

/// GET, PUT and DELETE on any other path.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    if !matches!(method, Method::GET | Method::PUT | Method::DELETE) {
        return Err(ServerError::MethodNotAllowed(method));
    }

    let header_token = header_str(&headers, TOKEN_HEADER)?;
    let target = Target::parse(uri.path(), header_token)?;
    if is_reserved_tenant(&target.token) {
        return Err(ServerError::ReservedTenant);
    }
    debug!(%method, space = %target.space, key = %target.key, "request");

    match method {
        Method::GET => get_value(&state, target, &headers).await,
        Method::PUT => put_value(&state, target, &headers, body).await,
        _ => delete_value(&state, target).await,
    }
}

async fn get_value(
    state: &AppState,
    target: Target,
    headers: &HeaderMap,
) -> ServerResult<Response> {
    let format = target.suffix.unwrap_or_else(|| {
        if media_type(headers, ACCEPT) == Some("application/json") {
            Format::Json
        } else {
            Format::Plain
        }
    });
    let value = blocking(state, move |backend| {
        let token = backend.resolve(&target.token)?;
        backend.get(&token, &target.space, &target.key)
    })
    .await?
    .ok_or(ServerError::NotFound)?;
    render(&value, format)
}

async fn put_value(
    state: &AppState,
    target: Target,
    headers: &HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    if target.key.is_empty() {
        return Err(ServerError::BadRequest("a key is required".into()));
    }
    let format = target.suffix.unwrap_or(match media_type(headers, CONTENT_TYPE) {
        Some("application/json") => Format::Json,
        Some("application/toml") => Format::Toml,
        _ => Format::Plain,
    });
    let value = decode_body(&body, format, header_str(headers, KEY_ID_HEADER)?)?;
    write(state, target, value).await
}

async fn delete_value(state: &AppState, target: Target) -> ServerResult<Response> {
    if target.key.is_empty() {
        return Err(ServerError::BadRequest("a key is required".into()));
    }
    write(state, target, None).await
}

async fn write(
    state: &AppState,
    target: Target,
    value: Option<Value>,
) -> ServerResult<Response> {
    blocking(state, move |backend| {
        let token = backend.resolve(&target.token)?;
        backend.set(&token, &target.space, &target.key, value)
    })
    .await?;
    Ok(().into_response())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> ServerResult<Option<&'a str>> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map_err(|_| ServerError::BadRequest(format!("{name} header is not valid text")))
        })
        .transpose()
}

/// The media type of a header, without parameters.
fn media_type(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<&str> {
    let value = headers.get(name)?.to_str().ok()?;
    value.split(';').next().map(str::trim)
}
