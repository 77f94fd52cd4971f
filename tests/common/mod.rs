//! Shared harness for API tests: an app over a fresh in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use followup::{
    AppState, app,
    auth::AuthKeys,
    db,
    directory::{self, Role},
    relay::Relay,
};

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn test_app() -> TestApp {
    let db_pool = db::connect("sqlite::memory:").await.unwrap();
    db::init(&db_pool).await.unwrap();

    let state = AppState {
        db_pool,
        auth_keys: AuthKeys::new(SECRET),
        relay: Arc::new(Relay::new()),
    };

    TestApp {
        router: app(state.clone()),
        state,
    }
}

/// Insert an account directly and return its identity.
pub async fn seed_user(
    state: &AppState,
    username: &str,
    password: &str,
    role: Role,
    display_name: &str,
) -> String {
    // minimum cost keeps the test suite fast
    let hash = bcrypt::hash(password, 4).unwrap();
    directory::create_user(&state.db_pool, username, &hash, role, display_name)
        .await
        .unwrap()
}

pub async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_owned()
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
