//! HTTP server for datum.
//!
//! Exposes `(token, space, key)` addressed config documents over plain
//! HTTP: GET renders values as text, JSON or TOML, PUT stores strings,
//! parsed JSON/TOML or encrypted payloads, DELETE removes keys. Alias
//! tokens are resolved before every request.

pub mod config;
pub mod error;
pub mod handler;
pub mod input;
pub mod render;
pub mod route;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use route::{Format, Target, KEY_ID_HEADER, TOKEN_HEADER};
pub use server::DatumServer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderName, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use datum_backend::{Backend, Document, EncryptedValue, InMemoryBlobStore, KeyPath, Value};
    use datum_types::{ONETIME_SPACE, RESERVED_TENANT, VIEWS_SPACE};
    use tower::util::ServiceExt;

    fn backend() -> Arc<Backend> {
        let backend = Backend::new(Arc::new(InMemoryBlobStore::new()))
            .with_token_generator(Arc::new(|| "ddeeff".to_string()));
        Arc::new(backend)
    }

    fn app(backend: &Arc<Backend>) -> Router {
        router::build_router(Arc::clone(backend), 1024)
    }

    async fn send(app: Router, req: Request<Body>) -> Response {
        app.oneshot(req).await.unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn put(uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .body(body.into())
            .unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn with_header(mut req: Request<Body>, name: &str, value: &str) -> Request<Body> {
        let name = HeaderName::try_from(name).unwrap();
        req.headers_mut().insert(name, value.parse().unwrap());
        req
    }

    fn with_token(req: Request<Body>, token: &str) -> Request<Body> {
        with_header(req, TOKEN_HEADER, token)
    }

    #[tokio::test]
    async fn create_returns_token() {
        let backend = backend();
        let req = Request::builder()
            .method("POST")
            .uri("/create")
            .body(Body::empty())
            .unwrap();
        let response = send(app(&backend), req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "ddeeff\n");
    }

    #[tokio::test]
    async fn create_onetime_registers_alias() {
        let backend = backend();
        let req = Request::builder()
            .method("POST")
            .uri("/create/onetime/aabbcc")
            .body(Body::empty())
            .unwrap();
        let response = send(app(&backend), req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "o-ddeeff\n");
        assert_eq!(
            backend
                .get_at(RESERVED_TENANT, ONETIME_SPACE, &KeyPath::single("o-ddeeff"))
                .unwrap(),
            Some(Value::from("aabbcc"))
        );
    }

    #[tokio::test]
    async fn create_onetime_rejects_alias_parent() {
        let backend = backend();
        let req = Request::builder()
            .method("POST")
            .uri("/create/onetime/v-abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(app(&backend), req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn put_then_get_with_space() {
        let backend = backend();
        let response = send(app(&backend), put("/aabbcc/~def/blah", "foo")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.get("aabbcc", "def", "blah").unwrap(), Some(Value::from("foo")));

        let response = send(app(&backend), get("/aabbcc/~def/blah")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "foo\n");
    }

    #[tokio::test]
    async fn put_nested_path() {
        let backend = backend();
        send(app(&backend), put("/aabbcc/~def/blah/bar", "foo")).await;
        assert_eq!(
            backend.load("aabbcc", "def").unwrap(),
            Document::new().with("blah", Document::new().with("bar", "foo"))
        );

        let response = send(app(&backend), get("/aabbcc/~def/blah")).await;
        assert_eq!(text(response).await, "{\"bar\":\"foo\"}\n");

        let response = send(app(&backend), get("/aabbcc/~def/blah/bar")).await;
        assert_eq!(text(response).await, "foo\n");
    }

    #[tokio::test]
    async fn put_json_body() {
        let backend = backend();
        let req = with_header(put("/aabbcc/~def/blah", "1"), "Content-Type", "application/json");
        let response = send(app(&backend), req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.get("aabbcc", "def", "blah").unwrap(), Some(Value::from(1)));
    }

    #[tokio::test]
    async fn put_json_suffix_object() {
        let backend = backend();
        let response = send(
            app(&backend),
            put("/aabbcc/db.json", r#"{"host":"localhost","port":5432}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            backend.get("aabbcc", "default", "db.port").unwrap(),
            Some(Value::from(5432))
        );
    }

    #[tokio::test]
    async fn put_json_null_deletes() {
        let backend = backend();
        backend.set("aabbcc", "default", "blah", Some("foo".into())).unwrap();
        let response = send(app(&backend), put("/aabbcc/blah.json", "null")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(backend.load("aabbcc", "default").unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_json_array_is_bad_request() {
        let backend = backend();
        let response = send(app(&backend), put("/aabbcc/blah.json", "[1]")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_scalar_as_json() {
        let backend = backend();
        backend.set("aabbcc", "def", "blah", Some("foo".into())).unwrap();

        let req = with_header(get("/aabbcc/~def/blah"), "Accept", "application/json");
        assert_eq!(text(send(app(&backend), req).await).await, "\"foo\"\n");

        let response = send(app(&backend), get("/aabbcc/~def/blah.json")).await;
        assert_eq!(text(response).await, "\"foo\"\n");
    }

    #[tokio::test]
    async fn get_tree_as_toml() {
        let backend = backend();
        backend.set("aabbcc", "def", "blah.bar", Some("foo".into())).unwrap();
        let response = send(app(&backend), get("/aabbcc/~def/blah.toml")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "bar = \"foo\"\n");
    }

    #[tokio::test]
    async fn get_space_as_toml() {
        let backend = backend();
        backend.set("aabbcc", "def", "bar", Some("foo".into())).unwrap();
        let response = send(app(&backend), get("/aabbcc/~def.toml")).await;
        assert_eq!(text(response).await, "bar = \"foo\"\n");
    }

    #[tokio::test]
    async fn default_space_with_path_token() {
        let backend = backend();
        send(app(&backend), put("/aabbcc/blah", "foo")).await;
        assert_eq!(
            backend.get("aabbcc", "default", "blah").unwrap(),
            Some(Value::from("foo"))
        );
        let response = send(app(&backend), get("/aabbcc/blah")).await;
        assert_eq!(text(response).await, "foo\n");
    }

    #[tokio::test]
    async fn header_token_addresses() {
        let backend = backend();
        send(app(&backend), with_token(put("/blah/bar", "foo"), "aabbcc")).await;
        send(app(&backend), with_token(put("/~here/blah", "qux"), "aabbcc")).await;
        assert_eq!(
            backend.get("aabbcc", "default", "blah.bar").unwrap(),
            Some(Value::from("foo"))
        );
        assert_eq!(
            backend.get("aabbcc", "here", "blah").unwrap(),
            Some(Value::from("qux"))
        );

        let response = send(app(&backend), with_token(get("/blah/bar"), "aabbcc")).await;
        assert_eq!(text(response).await, "foo\n");
        let response = send(app(&backend), with_token(get("/~here"), "aabbcc")).await;
        assert_eq!(text(response).await, "{\"blah\":\"qux\"}\n");
    }

    #[tokio::test]
    async fn delete_removes_and_prunes() {
        let backend = backend();
        backend.set("aabbcc", "def", "blah.bar", Some("foo".into())).unwrap();
        let response = send(app(&backend), delete("/aabbcc/~def/blah/bar")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(backend.load("aabbcc", "def").unwrap().is_empty());

        let response = send(app(&backend), with_token(delete("/~def/missing"), "aabbcc")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_value_is_not_found() {
        let backend = backend();
        let response = send(app(&backend), get("/aabbcc/~def/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_token_is_bad_request() {
        let backend = backend();
        let response = send(app(&backend), get("/~def/blah")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reserved_tenant_is_forbidden() {
        let backend = backend();
        backend.create_onetime("aabbcc").unwrap();
        for req in [get("/_/~onetime"), put("/_/~onetime/o-x", "evil"), delete("/_/~views/v-x")] {
            assert_eq!(send(app(&backend), req).await.status(), StatusCode::FORBIDDEN);
        }
        let response = send(app(&backend), with_token(get("/~onetime"), "_")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn not_a_map_is_bad_request() {
        let backend = backend();
        backend.set("aabbcc", "default", "blah", Some("foo".into())).unwrap();
        let response = send(app(&backend), put("/aabbcc/blah/bar", "x")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn view_token_maps_to_parent() {
        let backend = backend();
        backend
            .set_at(
                RESERVED_TENANT,
                VIEWS_SPACE,
                &KeyPath::single("v-ddeeff"),
                Some("aabbcc".into()),
            )
            .unwrap();
        backend.set("aabbcc", "def", "bar", Some("foo".into())).unwrap();

        for _ in 0..2 {
            let response = send(app(&backend), get("/v-ddeeff/~def/bar")).await;
            assert_eq!(text(response).await, "foo\n");
        }
        send(app(&backend), put("/v-ddeeff/~def/bar", "new")).await;
        assert_eq!(backend.get("aabbcc", "def", "bar").unwrap(), Some(Value::from("new")));
    }

    #[tokio::test]
    async fn onetime_token_works_once() {
        let backend = backend();
        backend.set("aabbcc", "def", "bar", Some("foo".into())).unwrap();
        let alias = backend.create_onetime("aabbcc").unwrap();

        let response = send(app(&backend), get(&format!("/{alias}/~def/bar"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "foo\n");

        let response = send(app(&backend), get(&format!("/{alias}/~def/bar"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn onetime_token_is_consumed_even_if_lookup_misses() {
        let backend = backend();
        let alias = backend.create_onetime("aabbcc").unwrap();
        let response = send(app(&backend), get(&format!("/{alias}/~def/missing"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(backend.resolve(&alias).is_err());
    }

    #[tokio::test]
    async fn encrypted_put_and_get() {
        let backend = backend();
        let req = with_header(put("/aabbcc/~def/bar", "foo"), KEY_ID_HEADER, "a1b2c3");
        assert_eq!(send(app(&backend), req).await.status(), StatusCode::OK);
        assert_eq!(
            backend.get("aabbcc", "def", "bar").unwrap(),
            Some(Value::Encrypted(EncryptedValue::new("a1b2c3", b"foo".to_vec())))
        );

        let response = send(app(&backend), get("/aabbcc/~def/bar")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[KEY_ID_HEADER], "a1b2c3");
        assert_eq!(text(response).await, "foo");

        let req = with_header(get("/aabbcc/~def/bar"), "Accept", "application/json");
        assert_eq!(
            text(send(app(&backend), req).await).await,
            "{\"keyid\":\"a1b2c3\",\"value\":\"Zm9v\"}\n"
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let backend = backend();
        let response = send(app(&backend), put("/aabbcc/blah", "x".repeat(4096))).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unsupported_method() {
        let backend = backend();
        let req = Request::builder()
            .method("POST")
            .uri("/aabbcc/blah")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            send(app(&backend), req).await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
