#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use user_api::{config::Config, db, AppState};

pub const PASSWORD: &str = "secret123";

pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        jwt_secret: "integration-test-secret".into(),
        ..Config::default()
    }
}

impl TestContext {
    pub async fn new() -> TestContext {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> TestContext {
        let pool = db::connect(&config.database_url)
            .await
            .expect("Failed to open in-memory database");
        let state = AppState::new(pool, config);
        TestContext {
            app: user_api::router(state.clone()),
            state,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, String)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.app.clone().oneshot(request).await.expect("request");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, &[]).await
    }

    pub async fn get_authed(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, None, &[bearer(token)]).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body), &[]).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: &str) -> TestResponse {
        self.send(Method::PUT, uri, Some(body), &[bearer(token)]).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, &[bearer(token)]).await
    }

    /// Creates a user with the shared test password and returns its JSON.
    pub async fn create_user(&self, username: &str) -> Value {
        let resp = self.post("/users", user_payload(username)).await;
        assert_eq!(resp.status, StatusCode::CREATED, "create {username}: {}", resp.body);
        resp.body
    }

    pub async fn create_user_with(&self, payload: Value) -> Value {
        let resp = self.post("/users", payload).await;
        assert_eq!(resp.status, StatusCode::CREATED, "create: {}", resp.body);
        resp.body
    }

    pub async fn login(&self, username: &str) -> String {
        let resp = self
            .post("/login", json!({"username": username, "password": PASSWORD}))
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login {username}: {}", resp.body);
        resp.body["token"].as_str().expect("token").to_string()
    }
}

pub fn user_payload(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": PASSWORD,
        "age": 25,
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|u| u["id"].as_i64().expect("id"))
        .collect()
}
