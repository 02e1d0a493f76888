mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::{json, Value};

const SENSITIVE_KEYS: &[&str] = &[
    "session_tokens",
    "tokens",
    "token",
    "user_emails",
    "emails",
    "email",
    "passwords",
    "password",
    "password_hash",
    "secrets",
    "authorization",
];

fn contains_sensitive_keys(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(k, v)| {
            SENSITIVE_KEYS.contains(&k.to_lowercase().as_str()) || contains_sensitive_keys(v)
        }),
        Value::Array(items) => items.iter().any(contains_sensitive_keys),
        _ => false,
    }
}

#[tokio::test]
async fn anonymous_stats_are_aggregates_only() {
    let ctx = TestContext::new().await;
    ctx.create_user("stat_one").await;
    ctx.create_user("stat_two").await;
    ctx.login("stat_one").await;

    let resp = ctx.get("/stats").await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.body;
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["active_users"], 2);
    assert_eq!(body["inactive_users"], 0);
    assert_eq!(body["active_sessions"], 1);
    assert_eq!(body["api_version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
    assert!(body.get("details").is_none());
    assert!(!contains_sensitive_keys(&body), "{body}");
}

#[tokio::test]
async fn detailed_stats_require_authentication() {
    let ctx = TestContext::new().await;
    ctx.create_user("snoop").await;
    ctx.login("snoop").await;

    let resp = ctx.get("/stats?include_details=true").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(!contains_sensitive_keys(&resp.body), "{}", resp.body);

    let bad_token = ctx
        .get_authed("/stats?include_details=true", "forged")
        .await;
    assert_eq!(bad_token.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn detailed_stats_for_authenticated_caller_leak_nothing() {
    let ctx = TestContext::new().await;
    let mut with_phone = common::user_payload("phoned");
    with_phone["phone"] = json!("+15551234567");
    with_phone["age"] = json!(30);
    ctx.create_user_with(with_phone).await;
    ctx.create_user("plain").await;
    let token = ctx.login("phoned").await;

    let resp = ctx.get_authed("/stats?include_details=true", &token).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    let details = &resp.body["details"];
    assert_eq!(details["average_age"], 27.5);
    assert_eq!(details["users_with_phone"], 1);
    assert_eq!(details["users_logged_in"], 1);
    assert!(!contains_sensitive_keys(&resp.body), "{}", resp.body);
}

#[tokio::test]
async fn counters_follow_creation_and_deletion() {
    let ctx = TestContext::new().await;
    let before = ctx.get("/stats").await.body["total_users"].as_i64().unwrap();

    let user = ctx.create_user("counted").await;
    let token = ctx.login("counted").await;
    let after = ctx.get("/stats").await.body;
    assert_eq!(after["total_users"].as_i64().unwrap(), before + 1);

    ctx.delete(&format!("/users/{}", user["id"]), &token).await;
    let deleted = ctx.get("/stats").await.body;
    assert_eq!(deleted["inactive_users"], 1);
    assert_eq!(deleted["active_sessions"], 0);
}

#[tokio::test]
async fn health_is_minimal_and_reports_db() {
    let ctx = TestContext::new().await;
    ctx.create_user("healthy").await;

    let resp = ctx.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], "healthy");
    assert_eq!(resp.body["db"], "ok");
    assert!(resp.body["timestamp"].is_string());
    assert!(resp.body.get("memory_users").is_none());
    assert!(!contains_sensitive_keys(&resp.body));

    let first = resp.body["uptime_seconds"].as_f64().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = ctx.get("/health").await.body["uptime_seconds"].as_f64().unwrap();
    assert!(second >= first);
}

#[tokio::test]
async fn health_degrades_when_database_is_gone() {
    let ctx = TestContext::new().await;
    ctx.state.db.close().await;

    let resp = ctx.get("/health").await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.body["status"], "degraded");
    assert_eq!(resp.body["db"], "unavailable");
}
