//! Common test utilities for integration tests.
//!
//! Most routers are backed by the in-memory repositories and need no
//! database. `create_postgres_test_app` connects to `TEST_DATABASE_URL`
//! instead and returns `None` when it is not set.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use event_suite_api::app::create_app;
use event_suite_api::config::{
    Config, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, StorageBackend,
};
use fake::{faker::name::en::Name, Fake};
use persistence::registry::AppRegistry;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

/// Test configuration using the in-memory backend.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0, // Disable rate limiting for tests
            hsts_enabled: false,
        },
    }
}

/// A fresh application with its own empty store.
pub fn create_test_app() -> Router {
    create_app(test_config(), AppRegistry::in_memory())
}

/// A router backed by PostgreSQL at `TEST_DATABASE_URL`, with migrations
/// applied. `None` when the variable is unset.
pub async fn create_postgres_test_app() -> Option<Router> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    let pool = persistence::db::create_pool(&persistence::db::DatabaseConfig {
        url: url.clone(),
        max_connections: 10,
        min_connections: 1,
        connect_timeout_secs: 10,
        idle_timeout_secs: 600,
    })
    .await
    .expect("Failed to connect to test database");
    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let mut config = test_config();
    config.database.backend = StorageBackend::Postgres;
    config.database.url = url;
    Some(create_app(config, AppRegistry::postgres(pool)))
}

/// Phone number derived from a random UUID, unique per call.
pub fn unique_phone_number() -> String {
    let digits = Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("+91{:010}", digits)
}

/// A date `days` from today.
pub fn days_from_now(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Sends a request and returns the status and parsed JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

/// Creates a user through the API and returns its JSON representation.
pub async fn create_user(app: &Router) -> Value {
    let name: String = Name().fake();
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/users",
            json!({
                "name": name,
                "phone_number": unique_phone_number(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {}", body);
    body
}

/// Request body for a three-day event starting thirty days from now.
pub fn event_body(capacity: Option<i32>, host_user_ids: &[&str]) -> Value {
    let start = days_from_now(30);
    json!({
        "name": "Winter Retreat",
        "description": "Three days of talks and walks",
        "location_name": "Hill Camp",
        "location_map_link": "https://maps.example.com/hill-camp",
        "organization": "Community Circle",
        "start_date": start,
        "end_date": start + Duration::days(2),
        "capacity": capacity,
        "days": [
            { "event_date": start, "breakfast_provided": true, "lunch_provided": true },
            { "event_date": start + Duration::days(1), "dinner_provided": true },
        ],
        "host_user_ids": host_user_ids,
    })
}

/// Creates an event through the API and returns its JSON representation.
pub async fn create_event(app: &Router, capacity: Option<i32>) -> Value {
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/v1/events", event_body(capacity, &[])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "event creation failed: {}", body);
    body
}

/// Registers a user for an event and returns the raw status and body.
pub async fn register(app: &Router, event_id: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/events/{}/registrations", event_id),
            body,
        ),
    )
    .await
}

/// Registers an individual and asserts success.
pub async fn register_user(app: &Router, event_id: &str, user_id: &str) -> Value {
    let (status, body) = register(app, event_id, json!({ "user_id": user_id })).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body
}

pub fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}
