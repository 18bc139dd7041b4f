#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use atlas_api::auth::jwt::{generate_access_token, JwtConfig};
use atlas_api::auth::password::hash_password;
use atlas_api::config::{AdminConfig, DataSource, ServerConfig};
use atlas_api::router::build_app_router;
use atlas_api::state::AppState;
use atlas_core::memory::MemoryStore;

pub const ADMIN_USERNAME: &str = "moderator";
pub const ADMIN_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` over the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_source: DataSource::Memory,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        admin: AdminConfig {
            username: ADMIN_USERNAME.to_string(),
            password_hash: Some(hash_password(ADMIN_PASSWORD).expect("hashing should succeed")),
        },
    }
}

/// Build the full application router over `store`, with the same middleware
/// stack production uses.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    build_app_with_config(store, test_config())
}

pub fn build_app_with_config(store: Arc<MemoryStore>, config: ServerConfig) -> Router {
    let state = AppState::new(config, store.clone(), store, None);
    build_app_router(state)
}

/// A valid admin bearer token for [`test_config`].
pub fn admin_token() -> String {
    token_with_role("admin")
}

pub fn token_with_role(role: &str) -> String {
    generate_access_token(ADMIN_USERNAME, role, &test_config().jwt)
        .expect("token generation should succeed")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
